//! Recovery notices from the control thread.
//!
//! By default each notice is one line on stderr. A front end that owns the
//! terminal turns on capture and drains the notices into its own display.

use std::fmt;
use std::sync::{Mutex, MutexGuard};

static CAPTURED: Mutex<Option<Vec<String>>> = Mutex::new(None);

fn captured() -> MutexGuard<'static, Option<Vec<String>>> {
    CAPTURED.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Hold notices for [`drain`] instead of printing them. Turning capture off
/// prints anything still held.
pub fn capture(enabled: bool) {
    let mut captured = captured();
    let held = captured.take();
    if enabled {
        *captured = Some(held.unwrap_or_default());
    } else {
        for message in held.into_iter().flatten() {
            eprintln!("{message}");
        }
    }
}

/// Take every held notice, oldest first.
pub fn drain() -> Vec<String> {
    captured().as_mut().map(std::mem::take).unwrap_or_default()
}

#[doc(hidden)]
pub fn report(args: fmt::Arguments<'_>) {
    let message = format!("synthograsizer: {args}");
    match captured().as_mut() {
        Some(held) => held.push(message),
        None => eprintln!("{message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captured_notices_are_held_until_drained() {
        capture(true);
        report(format_args!("bpm = {} is out of range", 999));
        let held = drain();
        capture(false);

        assert!(held.iter().any(|m| m == "synthograsizer: bpm = 999 is out of range"));
    }
}
