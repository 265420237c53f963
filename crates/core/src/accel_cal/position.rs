//! Commanded vehicle orientations
//!
//! The six-position procedure walks the operator through these placements in
//! order. Numeric values match MAVLink `ACCELCAL_VEHICLE_POS`.

use core::fmt;

/// Physical placement requested for one orientation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VehiclePosition {
    Level = 1,
    Left = 2,
    Right = 3,
    NoseDown = 4,
    NoseUp = 5,
    Back = 6,
}

impl VehiclePosition {
    /// Position for a 1-based step. Steps beyond the sixth have no fixed
    /// placement.
    pub fn from_step(step: u8) -> Option<Self> {
        match step {
            1 => Some(VehiclePosition::Level),
            2 => Some(VehiclePosition::Left),
            3 => Some(VehiclePosition::Right),
            4 => Some(VehiclePosition::NoseDown),
            5 => Some(VehiclePosition::NoseUp),
            6 => Some(VehiclePosition::Back),
            _ => None,
        }
    }

    /// 1-based step this position belongs to
    pub fn step(self) -> u8 {
        self as u8
    }

    /// Phrase completing "Place vehicle ..."
    pub fn as_str(self) -> &'static str {
        match self {
            VehiclePosition::Level => "level",
            VehiclePosition::Left => "on its LEFT side",
            VehiclePosition::Right => "on its RIGHT side",
            VehiclePosition::NoseDown => "nose DOWN",
            VehiclePosition::NoseUp => "nose UP",
            VehiclePosition::Back => "on its BACK",
        }
    }
}

impl fmt::Display for VehiclePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for VehiclePosition {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_step(value).ok_or(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_round_trip() {
        for step in 1..=6 {
            let position = VehiclePosition::from_step(step).unwrap();
            assert_eq!(position.step(), step);
        }
        assert_eq!(VehiclePosition::from_step(0), None);
        assert_eq!(VehiclePosition::from_step(7), None);
    }

    #[test]
    fn test_try_from_rejects_out_of_range() {
        assert_eq!(VehiclePosition::try_from(4), Ok(VehiclePosition::NoseDown));
        assert_eq!(VehiclePosition::try_from(9), Err(9));
    }

    #[test]
    fn test_prompt_phrases() {
        assert_eq!(VehiclePosition::Left.as_str(), "on its LEFT side");
        assert_eq!(VehiclePosition::Back.as_str(), "on its BACK");
    }
}
