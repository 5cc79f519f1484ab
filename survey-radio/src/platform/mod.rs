#[cfg(target_os = "linux")]
#[path = "linux.rs"]
mod platform_impl;

#[cfg(not(target_os = "linux"))]
#[path = "platform_dummy.rs"]
mod platform_impl;

pub use platform_impl::*;
