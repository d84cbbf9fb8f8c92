// UI module - Slint window and event loop bridge
//
// This module contains:
// - EventLoopBridge: Hands work between the tokio runtime and the Slint event loop
// - GuiController: Binds the window's callbacks and properties to a LabelSession

pub mod bridge;
pub mod controller;

pub use bridge::{EventLoopBridge, EventLoopBridgeHandle};
pub use controller::{GuiController, decode_preview};
