//! Rule tables for k-state, radius-r one-dimensional automata.
//!
//! A rule table maps every neighborhood of `2r + 1` base-k digits to the next
//! value of the center cell. Tables come from three sources:
//! - the named preset catalogue (`preset`)
//! - user-authored digit-string maps (`RuleTable::with_defaults`)
//! - seeded random generation (`random`)

pub mod key;
pub mod table;
pub mod preset;
pub mod random;
pub mod source;
pub mod validation;

pub use key::{decode, encode, key_string, parse_key};
pub use table::RuleTable;
pub use preset::{Preset, PresetInfo};
pub use random::{mutate_table, random_lattice, random_table};
pub use source::build_rule;
pub use validation::validate_rule;
