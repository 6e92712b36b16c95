//! Human editable markdown stores.
//!
//! All stores share one line format handled by [markdown]:
//!  - A record starts at a numbered header line `<N>. ...`.
//!  - `- Key: value` lines below the header are attributes of that record.
//!  - `- [ ] text` and `- [x] text` lines are checklist entries.
//!  - Blank lines and `#` comments are skipped.
//!
//! Stores are append-mostly and assume a single writer.

pub mod events;
pub mod markdown;
pub mod quotes;
pub mod routines;
