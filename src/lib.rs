//! Shell-syntax paths, quoting and filesystem commands for POSIX `sh` and
//! Windows `cmd.exe`. Nothing is executed; every operation returns strings.

#[macro_use]
extern crate log;

pub use error::{Error, Result};
pub use path::Flavor;
pub use platform::{Registry, ShellFamily, new_renderer};
pub use posix::PosixRenderer;
pub use renderer::{
    AnyRenderer, Command, Commands, FileMode, OutputRenderer, PathRenderer, Renderer,
    ScriptRenderer,
};
pub use windows::WindowsRenderer;

mod error;
pub mod path;
mod platform;
mod posix;
mod renderer;
mod windows;
