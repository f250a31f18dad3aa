//! Inbound commands to the application service.
//!
//! These arrive as short text lines over the wireless link (or the serial
//! console) and are interpreted by
//! [`ClusterService`](super::service::ClusterService). Matching ignores
//! ASCII case and surrounding whitespace; the text of `MSG:` is kept as is.
//!
//! | Line          | Command                         |
//! |---------------|---------------------------------|
//! | `LIGHTS`      | toggle the lights relay         |
//! | `LIGHTS:ON`   | lights on                       |
//! | `LIGHTS:OFF`  | lights off                      |
//! | `MENU`/`NEXT` | next page                       |
//! | `PREV`        | previous page                   |
//! | `PAGE:<n>`    | jump to page `n`                |
//! | `SLEEP`       | enter low-power mode            |
//! | `WAKE`        | leave low-power mode            |
//! | `MSG:<text>`  | transient overlay (empty clears)|
//! | `OFF`         | accepted, does nothing          |

use core::fmt;

use heapless::String;

use crate::display::overlay::MAX_OVERLAY_CHARS;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    ToggleLights,
    SetLights(bool),
    NextPage,
    PreviousPage,
    ShowPage(usize),
    Sleep,
    Wake,
    /// Show (or, when empty, clear) a transient message.
    Message(String<MAX_OVERLAY_CHARS>),
    /// The transport gained a client.
    ClientConnected,
    /// The transport lost its client.
    ClientDisconnected,
    /// Recognised but has no effect (`OFF`).
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Blank line.
    Empty,
    /// Not a command this cluster knows.
    Unknown,
    /// `PAGE:` without a valid non-negative number.
    BadPageIndex,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty command"),
            Self::Unknown => write!(f, "unknown command"),
            Self::BadPageIndex => write!(f, "bad page index"),
        }
    }
}

impl AppCommand {
    /// Parse one command line.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(CommandError::Empty);
        }

        let (verb, arg) = match line.split_once(':') {
            Some((verb, arg)) => (verb.trim(), Some(arg)),
            None => (line, None),
        };
        let is = |name: &str| verb.eq_ignore_ascii_case(name);

        match arg {
            None if is("LIGHTS") => Ok(Self::ToggleLights),
            None if is("MENU") || is("NEXT") => Ok(Self::NextPage),
            None if is("PREV") => Ok(Self::PreviousPage),
            None if is("SLEEP") => Ok(Self::Sleep),
            None if is("WAKE") => Ok(Self::Wake),
            None if is("OFF") => Ok(Self::Ignored),
            Some(arg) if is("LIGHTS") => match arg.trim() {
                a if a.eq_ignore_ascii_case("ON") => Ok(Self::SetLights(true)),
                a if a.eq_ignore_ascii_case("OFF") => Ok(Self::SetLights(false)),
                _ => Err(CommandError::Unknown),
            },
            Some(arg) if is("PAGE") => arg
                .trim()
                .parse::<usize>()
                .map(Self::ShowPage)
                .map_err(|_| CommandError::BadPageIndex),
            Some(arg) if is("MSG") => {
                let mut text = String::new();
                for ch in arg.trim().chars() {
                    if text.push(ch).is_err() {
                        break;
                    }
                }
                Ok(Self::Message(text))
            }
            _ => Err(CommandError::Unknown),
        }
    }
}
