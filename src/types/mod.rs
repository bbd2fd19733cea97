//! Oracle column value types
//!
//! LOB kinds, locators and content, and the DATE representation used by
//! typecast declarations.

mod date;
mod lob;

pub use date::OracleDate;
pub use lob::{LobData, LobKind, LobLocator};
