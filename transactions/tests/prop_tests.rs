use proptest::prelude::*;

use carbon_crypto::{derive_address, public_from_private};
use carbon_transactions::rlp::{self, RlpItem, RlpStream};
use carbon_transactions::{CarbonCreditCall, DecodedTransaction, TransactionRequest};
use carbon_types::{Address, ChainId, CreditId, PrivateKey};

/// Keys below the curve order: a fixed 0x01 high byte and 31 random bytes.
fn key_bytes() -> impl Strategy<Value = [u8; 32]> {
    prop::array::uniform32(0u8..).prop_map(|mut bytes| {
        bytes[0] = 0x01;
        bytes
    })
}

fn credit_id() -> impl Strategy<Value = CreditId> {
    (1u16..).prop_map(|raw| CreditId::new(raw).unwrap())
}

fn address() -> impl Strategy<Value = Address> {
    prop::array::uniform20(0u8..).prop_map(Address::new)
}

fn call() -> impl Strategy<Value = CarbonCreditCall> {
    prop_oneof![
        (address(), any::<u32>(), ".{0,80}").prop_map(|(to, amount, location)| {
            CarbonCreditCall::IssueCredit { to, amount, location }
        }),
        (credit_id(), address(), any::<u32>())
            .prop_map(|(id, to, amount)| CarbonCreditCall::TransferCredit { id, to, amount }),
        credit_id().prop_map(|id| CarbonCreditCall::RetireCredit { id }),
        (credit_id(), ".{0,80}").prop_map(|(id, new_location)| {
            CarbonCreditCall::UpdateCreditLocation { id, new_location }
        }),
        credit_id().prop_map(|id| CarbonCreditCall::Credits { id }),
        Just(CarbonCreditCall::NextId),
    ]
}

proptest! {
    /// Call data always starts with the selector and is word-aligned after it.
    #[test]
    fn call_data_layout(call in call()) {
        let encoded = call.encode();
        prop_assert_eq!(&encoded[..4], &call.selector()[..]);
        prop_assert_eq!((encoded.len() - 4) % 32, 0);
        prop_assert_eq!(CarbonCreditCall::decode(&encoded).unwrap(), call);
    }

    /// Any byte string survives the RLP codec, in or out of a list.
    #[test]
    fn rlp_bytes_survive(payload in prop::collection::vec(any::<u8>(), 0..200)) {
        let mut stream = RlpStream::new();
        stream.append_bytes(&payload);
        let decoded = rlp::decode(&stream.finish()).unwrap();
        prop_assert_eq!(decoded, RlpItem::List(vec![RlpItem::Bytes(payload)]));
    }

    /// Trailing garbage after a complete item is rejected.
    #[test]
    fn rlp_rejects_trailing_bytes(value in any::<u64>(), extra in 1u8..) {
        let mut stream = RlpStream::new();
        stream.append_u64(value);
        let mut raw = stream.finish();
        raw.push(extra);
        prop_assert!(rlp::decode(&raw).is_err());
    }

    /// A signed transaction decodes to the same fields and recovers its sender.
    #[test]
    fn signed_transaction_recovers_sender(
        key in key_bytes(),
        nonce in any::<u64>(),
        gas_limit in 21_000u64..10_000_000,
        chain_id in 1u64..1_000_000_000,
        call in call(),
    ) {
        let private = PrivateKey(key);
        let from = derive_address(&public_from_private(&private).unwrap());
        let to = Address::new([0x42; 20]);
        let data = call.encode();

        let request = TransactionRequest {
            from,
            nonce,
            gas_price: 5_000_000_000,
            gas_limit,
            to,
            value: 0,
            data: data.clone(),
            chain_id: ChainId(chain_id),
        };
        let signed = request.sign(&private).unwrap();
        let decoded = DecodedTransaction::decode(signed.raw()).unwrap();

        prop_assert_eq!(decoded.nonce, nonce);
        prop_assert_eq!(decoded.gas_limit, gas_limit);
        prop_assert_eq!(decoded.chain_id, ChainId(chain_id));
        prop_assert_eq!(decoded.to, to);
        prop_assert_eq!(&decoded.data, &data);
        prop_assert_eq!(decoded.hash, signed.hash());
        prop_assert_eq!(decoded.sender().unwrap(), from);
    }
}
