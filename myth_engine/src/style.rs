//! Styling helpers for terminal output.
//!
//! The [`GameStyle`] trait applies ANSI styling via the `colored` crate. It is implemented
//! for `&str` and `String` so literals can be styled directly.

use colored::{ColoredString, Colorize};

/// Convenience trait for applying color and style to text output.
pub trait GameStyle {
    fn player_style(&self) -> ColoredString;
    fn npc_style(&self) -> ColoredString;
    fn item_style(&self) -> ColoredString;
    fn portal_style(&self) -> ColoredString;
    fn wall_style(&self) -> ColoredString;
    fn floor_style(&self) -> ColoredString;
    fn map_title_style(&self) -> ColoredString;
    fn message_style(&self) -> ColoredString;
    fn quest_active_style(&self) -> ColoredString;
    fn quest_complete_style(&self) -> ColoredString;
    fn history_style(&self) -> ColoredString;
    fn denied_style(&self) -> ColoredString;
    fn error_style(&self) -> ColoredString;
    fn prompt_style(&self) -> ColoredString;
    fn section_style(&self) -> ColoredString;
}

impl GameStyle for &str {
    fn player_style(&self) -> ColoredString {
        self.bold().truecolor(102, 208, 250)
    }
    fn npc_style(&self) -> ColoredString {
        self.truecolor(13, 130, 60).underline()
    }
    fn item_style(&self) -> ColoredString {
        self.truecolor(220, 180, 40)
    }
    fn portal_style(&self) -> ColoredString {
        self.bold().truecolor(220, 40, 220)
    }
    fn wall_style(&self) -> ColoredString {
        self.truecolor(120, 110, 100)
    }
    fn floor_style(&self) -> ColoredString {
        self.dimmed().truecolor(75, 80, 75)
    }
    fn map_title_style(&self) -> ColoredString {
        self.truecolor(223, 77, 10).underline()
    }
    fn message_style(&self) -> ColoredString {
        self.italic().truecolor(230, 230, 30)
    }
    fn quest_active_style(&self) -> ColoredString {
        self.truecolor(220, 40, 220)
    }
    fn quest_complete_style(&self) -> ColoredString {
        self.truecolor(220, 40, 220).strikethrough()
    }
    fn history_style(&self) -> ColoredString {
        self.italic().truecolor(75, 180, 255)
    }
    fn denied_style(&self) -> ColoredString {
        self.italic().truecolor(230, 80, 80)
    }
    fn error_style(&self) -> ColoredString {
        self.truecolor(230, 30, 30)
    }
    fn prompt_style(&self) -> ColoredString {
        self.truecolor(180, 180, 180)
    }
    fn section_style(&self) -> ColoredString {
        let bracketed = format!("[{self}]");
        bracketed.truecolor(75, 80, 75)
    }
}

impl GameStyle for String {
    fn player_style(&self) -> ColoredString {
        self.as_str().player_style()
    }
    fn npc_style(&self) -> ColoredString {
        self.as_str().npc_style()
    }
    fn item_style(&self) -> ColoredString {
        self.as_str().item_style()
    }
    fn portal_style(&self) -> ColoredString {
        self.as_str().portal_style()
    }
    fn wall_style(&self) -> ColoredString {
        self.as_str().wall_style()
    }
    fn floor_style(&self) -> ColoredString {
        self.as_str().floor_style()
    }
    fn map_title_style(&self) -> ColoredString {
        self.as_str().map_title_style()
    }
    fn message_style(&self) -> ColoredString {
        self.as_str().message_style()
    }
    fn quest_active_style(&self) -> ColoredString {
        self.as_str().quest_active_style()
    }
    fn quest_complete_style(&self) -> ColoredString {
        self.as_str().quest_complete_style()
    }
    fn history_style(&self) -> ColoredString {
        self.as_str().history_style()
    }
    fn denied_style(&self) -> ColoredString {
        self.as_str().denied_style()
    }
    fn error_style(&self) -> ColoredString {
        self.as_str().error_style()
    }
    fn prompt_style(&self) -> ColoredString {
        self.as_str().prompt_style()
    }
    fn section_style(&self) -> ColoredString {
        self.as_str().section_style()
    }
}
