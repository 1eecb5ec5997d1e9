//! Property-based test generators using proptest.
//!
//! Provides strategies for generating attribute names, values and operation
//! sequences that stay within the store's argument rules.

use proptest::prelude::*;

/// Names drawn often enough that generated sequences overwrite and remove
/// existing attributes.
const COMMON_NAMES: &[&str] = &["alpha", "beta", "gamma", "user.comment", "k"];

/// Strategy for generating valid attribute names.
///
/// Mixes a small fixed pool with arbitrary names so sequences hit both the
/// overwrite and the append paths.
pub fn attr_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => prop::sample::select(COMMON_NAMES).prop_map(str::to_string),
        1 => prop::string::string_regex("[a-zA-Z][a-zA-Z0-9_.]{0,23}").expect("Invalid regex"),
    ]
}

/// Strategy for generating attribute values (arbitrary bytes, possibly
/// empty, sometimes larger than one shift chunk).
pub fn attr_value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        4 => prop::collection::vec(any::<u8>(), 0..64),
        1 => prop::collection::vec(any::<u8>(), 0..6000),
    ]
}

/// Operations for property-based testing.
#[derive(Debug, Clone)]
pub enum AttrOperation {
    /// Set an attribute.
    Set {
        /// Attribute name.
        name: String,
        /// New value.
        value: Vec<u8>,
    },
    /// Remove an attribute.
    Remove {
        /// Attribute name.
        name: String,
    },
    /// Read an attribute.
    Get {
        /// Attribute name.
        name: String,
    },
    /// List all attribute names.
    List,
}

/// Strategy for generating single attribute operations.
pub fn attr_operation_strategy() -> impl Strategy<Value = AttrOperation> {
    prop_oneof![
        4 => (attr_name_strategy(), attr_value_strategy())
            .prop_map(|(name, value)| AttrOperation::Set { name, value }),
        2 => attr_name_strategy().prop_map(|name| AttrOperation::Remove { name }),
        2 => attr_name_strategy().prop_map(|name| AttrOperation::Get { name }),
        1 => Just(AttrOperation::List),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(max_len: usize) -> impl Strategy<Value = Vec<AttrOperation>> {
    prop::collection::vec(attr_operation_strategy(), 1..max_len)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for tests that touch the filesystem on
    /// every operation.
    #[must_use]
    pub fn on_disk() -> Self {
        Self {
            cases: 12,
            max_shrink_iters: 50,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
