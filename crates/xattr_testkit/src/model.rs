//! Reference model for attribute stores.
//!
//! [`ModelChecker`] applies each operation to a store and to a plain
//! in-memory model, then compares what both report. The model tracks record
//! order too: a set of an existing name moves it to the end, a new name is
//! appended, and a removal drops it.

use crate::generators::AttrOperation;
use std::path::{Path, PathBuf};
use xattr_core::{AttrStore, CoreError, HandleProvider};

/// Checks one path of a store against the reference model.
pub struct ModelChecker<'a, P: HandleProvider> {
    store: &'a AttrStore<P>,
    path: PathBuf,
    model: Vec<(String, Vec<u8>)>,
}

impl<'a, P: HandleProvider> ModelChecker<'a, P> {
    /// Creates a checker for `path`, which must not have attributes yet.
    pub fn new(store: &'a AttrStore<P>, path: impl AsRef<Path>) -> Self {
        Self {
            store,
            path: path.as_ref().to_path_buf(),
            model: Vec::new(),
        }
    }

    /// Returns the names the model expects, in log order.
    pub fn expected_names(&self) -> Vec<String> {
        self.model.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Applies `op` to both sides and compares the results.
    ///
    /// # Errors
    ///
    /// Returns a description of the first divergence.
    pub fn apply(&mut self, op: &AttrOperation) -> Result<(), String> {
        match op {
            AttrOperation::Set { name, value } => {
                self.store
                    .set(&self.path, name, value)
                    .map_err(|e| format!("set {name:?} failed: {e}"))?;
                self.model.retain(|(n, _)| n != name);
                self.model.push((name.clone(), value.clone()));
            }
            AttrOperation::Remove { name } => {
                let expected = self.position(name);
                match (self.store.remove(&self.path, name), expected) {
                    (Ok(()), Some(index)) => {
                        self.model.remove(index);
                    }
                    (Err(CoreError::NotFound { .. }), None) => {}
                    (result, expected) => {
                        return Err(format!(
                            "remove {name:?}: store gave {result:?}, model expected present={}",
                            expected.is_some()
                        ));
                    }
                }
            }
            AttrOperation::Get { name } => self.check_get(name)?,
            AttrOperation::List => self.check_list()?,
        }
        Ok(())
    }

    /// Compares the full listing and every value.
    ///
    /// # Errors
    ///
    /// Returns a description of the first divergence.
    pub fn verify(&self) -> Result<(), String> {
        self.check_list()?;
        for (name, _) in &self.model {
            self.check_get(name)?;
        }
        Ok(())
    }

    /// Applies every operation, verifying after each one.
    ///
    /// # Errors
    ///
    /// Returns a description of the first divergence, prefixed with the
    /// operation's index.
    pub fn run(&mut self, ops: &[AttrOperation]) -> Result<(), String> {
        for (index, op) in ops.iter().enumerate() {
            self.apply(op)
                .and_then(|()| self.verify())
                .map_err(|e| format!("op #{index} {op:?}: {e}"))?;
        }
        Ok(())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.model.iter().position(|(n, _)| n == name)
    }

    fn check_list(&self) -> Result<(), String> {
        let actual = self
            .store
            .list(&self.path)
            .map_err(|e| format!("list failed: {e}"))?;
        let expected = self.expected_names();
        if actual != expected {
            return Err(format!("list: store {actual:?}, model {expected:?}"));
        }
        Ok(())
    }

    fn check_get(&self, name: &str) -> Result<(), String> {
        let expected = self.position(name).map(|i| &self.model[i].1);
        let has = self
            .store
            .has(&self.path, name)
            .map_err(|e| format!("has {name:?} failed: {e}"))?;
        if has != expected.is_some() {
            return Err(format!("has {name:?}: store {has}, model {}", !has));
        }

        match (self.store.get(&self.path, name), expected) {
            (Ok(actual), Some(expected)) if &actual == expected => Ok(()),
            (Err(CoreError::NotFound { .. }), None) => Ok(()),
            (result, expected) => Err(format!(
                "get {name:?}: store {:?}, model {:?}",
                result.map(|v| v.len()),
                expected.map(Vec::len)
            )),
        }
    }
}
