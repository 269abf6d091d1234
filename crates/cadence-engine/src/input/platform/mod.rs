//! Host-specific input translation.

mod winit;

pub use self::winit::WinitTranslator;
