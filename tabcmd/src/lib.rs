//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the tabcmd project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! tabcmd: a Vim-style command-line engine for a tabbed browser.
//!
//! Lines are tokenized by [`parser`], ranges are resolved to tab indices
//! by [`range`], settings are read and mutated through [`settings`] and
//! everything is tied together by the [`executor::Executor`], which looks
//! commands up in the [`registry`] and runs the [`builtins`] against a
//! [`host::Host`].

pub mod builtins;
pub mod error;
pub mod executor;
pub mod history;
pub mod host;
pub mod notify;
pub mod parser;
pub mod range;
pub mod registry;
pub mod settings;
pub mod shell;

pub use error::{CmdError, DispatchError, ParseError, RangeError, Result, SettingError};
pub use executor::{normalize, Dispatched, Executor, Invocation};
pub use history::{CommandHistory, HistoryMode};
pub use host::{Host, LocalHost, Target};
pub use notify::{Notification, NotifyKind, Source};
pub use parser::{parse, ParsedCommand};
pub use range::{resolve, RangeResult};
pub use registry::{CommandFlags, Registry, Resolved};
pub use settings::{SetOp, SetOutput, SettingValue, Settings};
pub use shell::{ShellOutput, SystemShell};
