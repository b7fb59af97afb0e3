//! Integration Test Harness
//!
//! - `TestTable` - an encounter manager with scripted dice and one open
//!   encounter, plus shortcuts for building a roster
//!
//! # Example
//!
//! ```rust,ignore
//! use harness::TestTable;
//!
//! #[test]
//! fn test_two_fighters() {
//!     let table = TestTable::new("Ambush", &[2, 9]).pc("a", 8).pc("b", 5);
//!     table.start();
//!     assert_eq!(table.order(), vec!["b", "a"]);
//! }
//! ```

mod table;

pub use table::TestTable;
