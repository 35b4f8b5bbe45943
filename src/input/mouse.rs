//! Mouse buttons and wheel directions

use super::InputError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Represents the different mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    /// Left mouse button (primary)
    Left,
    /// Right mouse button (secondary/context menu)
    Right,
    /// Middle mouse button (scroll wheel click)
    Middle,
    /// First side button (usually "back")
    X1,
    /// Second side button (usually "forward")
    X2,
}

impl std::fmt::Display for MouseButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MouseButton::Left => write!(f, "left"),
            MouseButton::Right => write!(f, "right"),
            MouseButton::Middle => write!(f, "middle"),
            MouseButton::X1 => write!(f, "x1"),
            MouseButton::X2 => write!(f, "x2"),
        }
    }
}

impl FromStr for MouseButton {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" | "lmb" => Ok(MouseButton::Left),
            "right" | "rmb" => Ok(MouseButton::Right),
            "middle" | "mmb" => Ok(MouseButton::Middle),
            "x1" | "back" => Ok(MouseButton::X1),
            "x2" | "forward" => Ok(MouseButton::X2),
            _ => Err(InputError::InvalidKey {
                key: format!("mouse:{}", s),
            }),
        }
    }
}

/// Direction of one wheel notch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    Down,
}

impl std::fmt::Display for ScrollDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScrollDirection::Up => write!(f, "up"),
            ScrollDirection::Down => write!(f, "down"),
        }
    }
}

impl FromStr for ScrollDirection {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(ScrollDirection::Up),
            "down" => Ok(ScrollDirection::Down),
            _ => Err(InputError::InvalidKey {
                key: format!("scroll:{}", s),
            }),
        }
    }
}
