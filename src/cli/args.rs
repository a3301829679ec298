//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};
use serde_json::{json, Map, Value};

use crate::domain::ButtonKind;

/// Edit official-account action menus: a two-level tree of typed buttons
#[derive(Parser, Debug)]
#[command(name = "wxmenu")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Menu file (default: menu_file setting)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    /// Project directory holding .wxmenu.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an empty menu file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the menu as a tree
    Show,

    /// Print the menu JSON
    Json {
        /// Single-line output
        #[arg(long)]
        compact: bool,
    },

    /// Check the menu against the platform caps
    Check,

    /// Count top-level buttons, or sub buttons of TOP
    Len {
        /// Top-level index
        top: Option<usize>,
    },

    /// Print one button as JSON
    Get {
        /// Top-level index
        top: usize,
        /// Sub button index
        sub: Option<usize>,
    },

    /// Append a top-level button
    AddTop {
        #[command(flatten)]
        button: ButtonArgs,
    },

    /// Append a sub button (a non-top target becomes a top button)
    AddSub {
        /// Top-level index
        top: usize,
        #[command(flatten)]
        button: ButtonArgs,
    },

    /// Replace the type and payload of a button (`--type top` clears its sub buttons)
    Set {
        /// Top-level index
        top: usize,
        /// Sub button index
        sub: Option<usize>,
        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Move a top-level button; NEW is the slot after removal
    MoveTop {
        old: usize,
        new: usize,
    },

    /// Move a sub button within its top button; NEW is the slot after removal
    MoveSub {
        /// Top-level index
        top: usize,
        old: usize,
        new: usize,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Show config file locations
    Path,
}

/// Button type as accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindArg {
    Top,
    Click,
    View,
    Miniprogram,
}

impl From<KindArg> for ButtonKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Top => ButtonKind::Top,
            KindArg::Click => ButtonKind::Click,
            KindArg::View => ButtonKind::View,
            KindArg::Miniprogram => ButtonKind::MiniProgram,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct PayloadArgs {
    /// Button type
    #[arg(short = 't', long = "type", value_enum)]
    pub kind: KindArg,

    /// Callback key (click)
    #[arg(long)]
    pub key: Option<String>,

    /// URL (view, miniprogram)
    #[arg(long, value_hint = ValueHint::Url)]
    pub url: Option<String>,

    /// Mini program app id (miniprogram)
    #[arg(long)]
    pub appid: Option<String>,

    /// Mini program page path (miniprogram)
    #[arg(long)]
    pub pagepath: Option<String>,
}

impl PayloadArgs {
    pub fn kind(&self) -> ButtonKind {
        self.kind.into()
    }

    /// Flags given that the selected type does not use.
    pub fn stray_flags(&self) -> Vec<&'static str> {
        let used: &[&str] = match self.kind() {
            ButtonKind::Top => &[],
            ButtonKind::Click => &["key"],
            ButtonKind::View => &["url"],
            ButtonKind::MiniProgram => &["url", "appid", "pagepath"],
        };
        [
            ("key", self.key.is_some()),
            ("url", self.url.is_some()),
            ("appid", self.appid.is_some()),
            ("pagepath", self.pagepath.is_some()),
        ]
        .into_iter()
        .filter(|(name, given)| *given && !used.contains(name))
        .map(|(name, _)| name)
        .collect()
    }

    /// Untyped payload; validation is left to the domain model.
    pub fn to_payload(&self) -> Value {
        let mut fields = Map::new();
        let optional = [
            ("key", &self.key),
            ("url", &self.url),
            ("appid", &self.appid),
            ("pagepath", &self.pagepath),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                fields.insert(name.to_string(), Value::from(value.as_str()));
            }
        }
        if self.kind() == ButtonKind::Top {
            fields.insert("sub_button".to_string(), json!([]));
        }
        Value::Object(fields)
    }
}

#[derive(Args, Debug, Clone)]
pub struct ButtonArgs {
    /// Display name
    pub name: String,

    #[command(flatten)]
    pub payload: PayloadArgs,
}

impl ButtonArgs {
    /// Entry in menu JSON shape.
    pub fn to_entry(&self) -> Value {
        let mut entry = Map::new();
        entry.insert("name".to_string(), Value::from(self.name.as_str()));
        entry.insert("type".to_string(), Value::from(self.payload.kind().as_str()));
        if let Value::Object(fields) = self.payload.to_payload() {
            entry.extend(fields);
        }
        Value::Object(entry)
    }
}
