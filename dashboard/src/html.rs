//! Server-side HTML rendering.

use std::fmt::Write;

use carbon_client::{ClientError, ReceiptStatus, TransactionReceipt};
use carbon_types::{Address, Credit, TxHash};
use carbon_utils::format_tons;

use crate::forms::Action;

/// Escape text for use in element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Success,
    Info,
    Warning,
    Error,
}

impl Tone {
    fn class(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A message box at the top of a page. `html` is trusted markup.
pub struct Notice {
    pub tone: Tone,
    pub html: String,
}

impl Notice {
    pub fn text(tone: Tone, text: &str) -> Self {
        Self {
            tone,
            html: escape(text),
        }
    }

    pub fn error(err: &ClientError) -> Self {
        let prefix = match err {
            ClientError::Transaction(_) => "Transaction failed",
            ClientError::RemoteRead(_) => "Could not read from the ledger",
            ClientError::Input(_) => "Invalid input",
            ClientError::Configuration(_) => "Configuration problem",
        };
        Self {
            tone: Tone::Error,
            html: format!("{prefix}: {}", escape(&err.to_string())),
        }
    }

    /// Write outcome with its transaction hash and explorer link.
    pub fn submitted(what: &str, hash: &TxHash, explorer_link: &str) -> Self {
        Self {
            tone: Tone::Success,
            html: format!(
                "{} <code>{hash}</code> <a href=\"{}\" target=\"_blank\" rel=\"noopener\">View on explorer</a>",
                escape(what),
                escape(explorer_link),
            ),
        }
    }
}

/// Everything the page chrome shows above the action area.
pub struct Header {
    pub operator: Option<Address>,
    pub total_issued: Result<u16, String>,
}

const STYLE: &str = "body{font-family:sans-serif;max-width:44rem;margin:2rem auto;padding:0 1rem}\
.notice{padding:.6rem .8rem;border-radius:4px;margin:.8rem 0}\
.success{background:#e3f6e5}.info{background:#e6f0fb}.warning{background:#fff4d6}.error{background:#fde2e1}\
nav a{margin-right:.8rem}label{display:block;margin-top:.6rem}input{width:100%;padding:.3rem}\
button{margin-top:.8rem}table{border-collapse:collapse}td,th{padding:.2rem .8rem;text-align:left}";

pub fn page(header: &Header, notices: &[Notice], body: &str) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<!doctype html><html><head><meta charset=\"utf-8\">\
         <title>Carbon Credit Ledger</title><style>{STYLE}</style></head><body>\
         <h1>Carbon Credit Management</h1>\
         <p>Issue, transfer, update location and retire carbon credits.</p>"
    );

    match header.operator {
        Some(address) => {
            let _ = write!(
                out,
                "<div class=\"notice success\">Connected as: <code>{address}</code>\
                 <form method=\"post\" action=\"/session/end\" style=\"display:inline\">\
                 <button type=\"submit\">Sign out</button></form></div>"
            );
        }
        None => out.push_str(&sign_in_form()),
    }

    match &header.total_issued {
        Ok(total) => {
            let _ = write!(out, "<div class=\"notice info\">Total Credits Issued: {total}</div>");
        }
        Err(message) => {
            let _ = write!(
                out,
                "<div class=\"notice error\">Error fetching total credits: {}</div>",
                escape(message)
            );
        }
    }

    out.push_str("<nav>");
    for action in Action::ALL {
        let _ = write!(out, "<a href=\"/actions/{}\">{}</a>", action.slug(), action.label());
    }
    out.push_str("</nav>");

    for notice in notices {
        let _ = write!(
            out,
            "<div class=\"notice {}\">{}</div>",
            notice.tone.class(),
            notice.html
        );
    }

    out.push_str(body);
    out.push_str("</body></html>");
    out
}

fn sign_in_form() -> String {
    "<div class=\"notice warning\">Enter your private key to interact with the ledger.\
     <form method=\"post\" action=\"/session\">\
     <label>Private key (testnet only)<input type=\"password\" name=\"private_key\" autocomplete=\"off\"></label>\
     <button type=\"submit\">Sign in</button></form></div>"
        .to_string()
}

fn field(label: &str, name: &str, kind: &str, extra: &str) -> String {
    format!("<label>{label}<input type=\"{kind}\" name=\"{name}\" required {extra}></label>")
}

/// The input form for one action.
pub fn action_form(action: Action) -> String {
    let id = field("Credit ID", "id", "number", "min=\"1\" max=\"65535\"");
    let (method, target, fields, button) = match action {
        Action::View => ("get", "/credits", id, "View"),
        Action::Issue => (
            "post",
            "/credits/issue",
            [
                field("Receiver Address", "to", "text", "placeholder=\"0x...\""),
                field("Amount (tons of CO₂)", "amount", "number", "min=\"1\""),
                field("Location", "location", "text", "placeholder=\"Amazon Rainforest, Brazil\""),
            ]
            .concat(),
            "Issue",
        ),
        Action::Transfer => (
            "post",
            "/credits/transfer",
            [
                id,
                field("New Owner Address", "to", "text", "placeholder=\"0x...\""),
                field("Amount to Transfer (tons of CO₂)", "amount", "number", "min=\"1\""),
            ]
            .concat(),
            "Transfer",
        ),
        Action::Retire => ("post", "/credits/retire", id, "Retire"),
        Action::UpdateLocation => (
            "post",
            "/credits/location",
            [id, field("New Location", "new_location", "text", "")].concat(),
            "Update",
        ),
    };
    format!(
        "<h2>{}</h2><form method=\"{method}\" action=\"{target}\">{fields}<button type=\"submit\">{button}</button></form>",
        action.label()
    )
}

/// Structured display of one credit record.
pub fn credit_table(credit: &Credit) -> String {
    format!(
        "<h2>Credit {}</h2><table>\
         <tr><th>ID</th><td>{}</td></tr>\
         <tr><th>Owner</th><td><code>{}</code></td></tr>\
         <tr><th>Amount</th><td>{}</td></tr>\
         <tr><th>Retired</th><td>{}</td></tr>\
         <tr><th>Location</th><td>{}</td></tr>\
         </table>",
        credit.id,
        credit.id,
        credit.owner,
        format_tons(credit.amount),
        if credit.retired { "yes" } else { "no" },
        escape(&credit.location),
    )
}

/// Receipt page for a submitted transaction. `None` means still pending.
pub fn receipt_view(hash: &TxHash, receipt: Option<&TransactionReceipt>, explorer_link: &str) -> String {
    let mut out = format!("<h2>Transaction</h2><p><code>{hash}</code></p>");
    match receipt {
        None => out.push_str("<div class=\"notice warning\">Pending: not yet included in a block.</div>"),
        Some(receipt) => {
            let status = match receipt.status {
                ReceiptStatus::Success => "confirmed",
                ReceiptStatus::Reverted => "reverted",
            };
            let _ = write!(
                out,
                "<table><tr><th>Status</th><td>{status}</td></tr>\
                 <tr><th>Block</th><td>{}</td></tr>\
                 <tr><th>Gas used</th><td>{}</td></tr></table>",
                receipt.block_number, receipt.gas_used,
            );
        }
    }
    let _ = write!(
        out,
        "<p><a href=\"{}\" target=\"_blank\" rel=\"noopener\">View on explorer</a></p>",
        escape(explorer_link)
    );
    out
}
