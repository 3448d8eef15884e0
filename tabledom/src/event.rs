use crate::tree::NodeRef;

/// Pointer events targeted at a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Pointer pressed over the target (the activation event).
    PointerDown { target: NodeRef, button: MouseButton },
    /// Pointer released over the target.
    PointerUp { target: NodeRef, button: MouseButton },
    /// Pointer moved over the target (for hover tracking).
    PointerMove { target: NodeRef },
}

impl Event {
    pub fn pointer_down(target: NodeRef) -> Self {
        Self::PointerDown {
            target,
            button: MouseButton::Left,
        }
    }

    /// The node the event was dispatched to.
    pub fn target(&self) -> NodeRef {
        match self {
            Self::PointerDown { target, .. }
            | Self::PointerUp { target, .. }
            | Self::PointerMove { target } => *target,
        }
    }

    /// Primary-button press, the only event that activates anything.
    pub fn is_activation(&self) -> bool {
        matches!(
            self,
            Self::PointerDown {
                button: MouseButton::Left,
                ..
            }
        )
    }
}

/// Mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}
