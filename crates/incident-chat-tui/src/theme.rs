use ratatui::style::Color;

pub struct Theme {
    pub name: &'static str,
    pub bg: Color,
    pub fg: Color,
    pub muted: Color,
    pub accent: Color,
    pub border: Color,
    pub highlight: Color,
    pub user: Color,
    pub bot: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
}

const fn hex(rgb: u32) -> Color {
    Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

pub const THEMES: [Theme; 4] = [
    Theme {
        name: "Tokyo Night",
        bg: hex(0x1a1b26),
        fg: hex(0xc0caf5),
        muted: hex(0x565f89),
        accent: hex(0x7aa2f7),
        border: hex(0x3b4261),
        highlight: hex(0x283457),
        user: hex(0x7dcfff),
        bot: hex(0xbb9af7),
        success: hex(0x9ece6a),
        warning: hex(0xe0af68),
        error: hex(0xf7768e),
    },
    Theme {
        name: "Catppuccin Mocha",
        bg: hex(0x1e1e2e),
        fg: hex(0xcdd6f4),
        muted: hex(0x6c7086),
        accent: hex(0xcba6f7),
        border: hex(0x45475a),
        highlight: hex(0x313244),
        user: hex(0x89b4fa),
        bot: hex(0xf5c2e7),
        success: hex(0xa6e3a1),
        warning: hex(0xf9e2af),
        error: hex(0xf38ba8),
    },
    Theme {
        name: "Nord",
        bg: hex(0x2e3440),
        fg: hex(0xeceff4),
        muted: hex(0x4c566a),
        accent: hex(0x88c0d0),
        border: hex(0x434c5e),
        highlight: hex(0x3b4252),
        user: hex(0x81a1c1),
        bot: hex(0xb48ead),
        success: hex(0xa3be8c),
        warning: hex(0xebcb8b),
        error: hex(0xbf616a),
    },
    Theme {
        name: "Gruvbox Dark",
        bg: hex(0x282828),
        fg: hex(0xebdbb2),
        muted: hex(0x928374),
        accent: hex(0xfabd2f),
        border: hex(0x504945),
        highlight: hex(0x3c3836),
        user: hex(0x83a598),
        bot: hex(0xd3869b),
        success: hex(0xb8bb26),
        warning: hex(0xfe8019),
        error: hex(0xfb4934),
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_conversion() {
        assert_eq!(hex(0x1a1b26), Color::Rgb(0x1a, 0x1b, 0x26));
    }

    #[test]
    fn test_theme_names_are_unique() {
        let mut names: Vec<_> = THEMES.iter().map(|t| t.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), THEMES.len());
    }
}
