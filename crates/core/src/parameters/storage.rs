//! Parameter Storage Types
//!
//! `ParameterStore` holds calibration settings and the corrections a
//! calibration produces. Every parameter is registered once with a default
//! value, which also fixes its type: later writes are converted to that type
//! so a float from a ground station cannot turn a sample count into a float.
//!
//! Flash persistence is outside this crate; callers watch
//! [`ParameterStore::is_dirty`] and clear it after writing.

use super::error::ParameterError;
use bitflags::bitflags;
use heapless::index_map::FnvIndexMap;
use heapless::String;

/// Maximum parameter name length (MAVLink param_id)
pub const PARAM_NAME_LEN: usize = 16;

/// Maximum number of parameters
pub const MAX_PARAMS: usize = 32;

bitflags! {
    /// Parameter flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ParamFlags: u8 {
        /// Rejected by `set`
        const READ_ONLY = 1 << 0;
        /// Written by a calibration procedure
        const CALIBRATION = 1 << 1;
    }
}

/// Parameter value types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Int(i32),
    Float(f32),
}

impl ParamValue {
    /// Numeric value as `f32`, whatever the stored type
    pub fn as_f32(&self) -> f32 {
        match *self {
            ParamValue::Bool(v) => f32::from(u8::from(v)),
            ParamValue::Int(v) => v as f32,
            ParamValue::Float(v) => v,
        }
    }

    /// `self` converted to the variant of `kind`.
    ///
    /// Floats round to the nearest integer; any non-zero value is `true`.
    pub fn converted_to(self, kind: &ParamValue) -> ParamValue {
        match kind {
            ParamValue::Bool(_) => ParamValue::Bool(self.as_f32() != 0.0),
            ParamValue::Int(_) => match self {
                ParamValue::Int(v) => ParamValue::Int(v),
                other => ParamValue::Int(libm::roundf(other.as_f32()) as i32),
            },
            ParamValue::Float(_) => ParamValue::Float(self.as_f32()),
        }
    }
}

/// One registered parameter
#[derive(Debug, Clone, Copy, PartialEq)]
struct ParamEntry {
    value: ParamValue,
    default: ParamValue,
    flags: ParamFlags,
}

type ParamName = String<PARAM_NAME_LEN>;

/// Registered parameters, in registration order
pub struct ParameterStore {
    entries: FnvIndexMap<ParamName, ParamEntry, MAX_PARAMS>,
    /// Changed since the last flash write
    dirty: bool,
}

fn param_name(name: &str) -> Result<ParamName, ParameterError> {
    let mut key = ParamName::new();
    key.push_str(name)
        .map_err(|_| ParameterError::InvalidConfig)?;
    Ok(key)
}

impl ParameterStore {
    pub fn new() -> Self {
        Self {
            entries: FnvIndexMap::new(),
            dirty: false,
        }
    }

    /// Register `name` with its default value and flags.
    ///
    /// Registering an existing name keeps its current value.
    ///
    /// # Errors
    ///
    /// - [`ParameterError::InvalidConfig`] for names over `PARAM_NAME_LEN`
    /// - [`ParameterError::StoreFull`] with `MAX_PARAMS` registered
    pub fn register(
        &mut self,
        name: &str,
        default: ParamValue,
        flags: ParamFlags,
    ) -> Result<(), ParameterError> {
        let key = param_name(name)?;
        if self.entries.contains_key(&key) {
            return Ok(());
        }

        let entry = ParamEntry {
            value: default,
            default,
            flags,
        };
        self.entries
            .insert(key, entry)
            .map_err(|_| ParameterError::StoreFull)?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entry(name).map(|entry| &entry.value)
    }

    /// Numeric parameter as `f32`
    pub fn get_f32(&self, name: &str) -> Option<f32> {
        self.get(name).map(ParamValue::as_f32)
    }

    /// Write a registered parameter, converting to its registered type.
    ///
    /// # Errors
    ///
    /// - [`ParameterError::InvalidConfig`] for unknown names
    /// - [`ParameterError::ReadOnly`] for `READ_ONLY` parameters
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<(), ParameterError> {
        let key = param_name(name)?;
        let entry = self
            .entries
            .get_mut(&key)
            .ok_or(ParameterError::InvalidConfig)?;
        if entry.flags.contains(ParamFlags::READ_ONLY) {
            return Err(ParameterError::ReadOnly);
        }

        let value = value.converted_to(&entry.default);
        if entry.value != value {
            entry.value = value;
            self.dirty = true;
        }
        Ok(())
    }

    /// Whether `set` would accept a write to `name`
    pub fn is_writable(&self, name: &str) -> bool {
        self.entry(name)
            .is_some_and(|entry| !entry.flags.contains(ParamFlags::READ_ONLY))
    }

    fn entry(&self, name: &str) -> Option<&ParamEntry> {
        let key = param_name(name).ok()?;
        self.entries.get(&key)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Call after the values reached flash.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Registered parameters
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(name: &str, value: ParamValue, flags: ParamFlags) -> ParameterStore {
        let mut store = ParameterStore::new();
        store.register(name, value, flags).unwrap();
        store
    }

    #[test]
    fn test_register_and_get() {
        let store = store_with("INS_ACAL_TOL", ParamValue::Float(0.5), ParamFlags::empty());

        assert_eq!(store.get("INS_ACAL_TOL"), Some(&ParamValue::Float(0.5)));
        assert_eq!(store.get_f32("INS_ACAL_TOL"), Some(0.5));
        assert!(store.get("INS_ACAL_NSMP").is_none());
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_set_converts_to_registered_type() {
        let mut store = store_with("INS_ACAL_NSMP", ParamValue::Int(6), ParamFlags::empty());

        store.set("INS_ACAL_NSMP", ParamValue::Float(7.6)).unwrap();

        assert_eq!(store.get("INS_ACAL_NSMP"), Some(&ParamValue::Int(8)));
        assert!(store.is_dirty());
    }

    #[test]
    fn test_set_same_value_stays_clean() {
        let mut store = store_with("INS_ACAL_TMO", ParamValue::Float(30.0), ParamFlags::empty());

        store.set("INS_ACAL_TMO", ParamValue::Int(30)).unwrap();

        assert!(!store.is_dirty());
    }

    #[test]
    fn test_set_unknown_or_read_only() {
        let mut store = store_with("BOARD_ID", ParamValue::Int(42), ParamFlags::READ_ONLY);

        assert_eq!(
            store.set("UNKNOWN", ParamValue::Int(1)),
            Err(ParameterError::InvalidConfig)
        );
        assert_eq!(
            store.set("BOARD_ID", ParamValue::Int(1)),
            Err(ParameterError::ReadOnly)
        );
        assert_eq!(store.get("BOARD_ID"), Some(&ParamValue::Int(42)));
    }

    #[test]
    fn test_name_too_long_is_rejected() {
        let mut store = ParameterStore::new();
        assert_eq!(
            store.register(
                "INS_ACC_CAL_SAMPLES",
                ParamValue::Int(6),
                ParamFlags::empty()
            ),
            Err(ParameterError::InvalidConfig)
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_register_keeps_existing_value() {
        let mut store = store_with("INS_ACAL_TOL", ParamValue::Float(0.5), ParamFlags::empty());
        store.set("INS_ACAL_TOL", ParamValue::Float(0.8)).unwrap();

        store
            .register("INS_ACAL_TOL", ParamValue::Float(0.5), ParamFlags::empty())
            .unwrap();

        assert_eq!(store.get_f32("INS_ACAL_TOL"), Some(0.8));
    }

    #[test]
    fn test_store_full() {
        let mut store = ParameterStore::new();
        let mut name = ParamName::new();
        for i in 0..MAX_PARAMS {
            name.clear();
            core::fmt::Write::write_fmt(&mut name, format_args!("P{}", i)).unwrap();
            store
                .register(&name, ParamValue::Int(0), ParamFlags::empty())
                .unwrap();
        }

        assert_eq!(
            store.register("OVERFLOW", ParamValue::Int(0), ParamFlags::empty()),
            Err(ParameterError::StoreFull)
        );
        assert_eq!(store.len(), MAX_PARAMS);
    }

    #[test]
    fn test_is_writable() {
        let mut store = store_with("BOARD_ID", ParamValue::Int(42), ParamFlags::READ_ONLY);
        store
            .register("INS_ACCOFFS_X", ParamValue::Float(0.0), ParamFlags::CALIBRATION)
            .unwrap();

        assert!(store.is_writable("INS_ACCOFFS_X"));
        assert!(!store.is_writable("BOARD_ID"));
        assert!(!store.is_writable("MISSING"));
    }

    #[test]
    fn test_bool_conversion() {
        assert_eq!(ParamValue::Bool(true).as_f32(), 1.0);
        assert_eq!(
            ParamValue::Float(2.0).converted_to(&ParamValue::Bool(false)),
            ParamValue::Bool(true)
        );
        assert_eq!(
            ParamValue::Int(0).converted_to(&ParamValue::Bool(true)),
            ParamValue::Bool(false)
        );
    }
}
