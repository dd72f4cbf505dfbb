use std::path::Path;

/// Comment syntax for one dialect: the file extensions it claims, its
/// comment markers, and the characters that open/close string literals.
#[derive(Debug, Clone, Copy)]
pub struct Descriptor {
    /// Lowercase extensions, no leading dot.
    pub extensions: &'static [&'static str],
    pub single_line: Option<&'static str>,
    pub multi_line: Option<(&'static str, &'static str)>,
    pub string_delimiters: &'static [char],
}

// C-style languages (C, C++, Java, JavaScript, C#, etc.)
static C_STYLE: Descriptor = Descriptor {
    extensions: &[
        "c", "cpp", "h", "hpp", "java", "js", "jsx", "ts", "tsx", "cs", "php", "swift", "go",
        "kt", "scala",
    ],
    single_line: Some("//"),
    multi_line: Some(("/*", "*/")),
    string_delimiters: &['"', '\'', '`'],
};

static SHELL: Descriptor = Descriptor {
    extensions: &["sh", "bash", "zsh", "ksh"],
    single_line: Some("#"),
    multi_line: None,
    string_delimiters: &['"', '\''],
};

// Python files may also use '''...''' blocks; the engine handles both
// triple-quote styles itself.
static PYTHON: Descriptor = Descriptor {
    extensions: &["py", "pyw", "pyc", "pyo", "pyd"],
    single_line: Some("#"),
    multi_line: Some(("\"\"\"", "\"\"\"")),
    string_delimiters: &['"', '\''],
};

static RUBY: Descriptor = Descriptor {
    extensions: &["rb", "rake", "gemspec"],
    single_line: Some("#"),
    multi_line: Some(("=begin", "=end")),
    string_delimiters: &['"', '\''],
};

static MARKUP: Descriptor = Descriptor {
    extensions: &["html", "htm", "xml", "svg", "xhtml", "jsp", "asp", "aspx"],
    single_line: None,
    multi_line: Some(("<!--", "-->")),
    string_delimiters: &['"', '\''],
};

// `//` is SCSS/LESS only, but plain CSS never contains it outside strings.
static CSS: Descriptor = Descriptor {
    extensions: &["css", "scss", "sass", "less"],
    single_line: Some("//"),
    multi_line: Some(("/*", "*/")),
    string_delimiters: &['"', '\''],
};

static SQL: Descriptor = Descriptor {
    extensions: &["sql", "sqlite", "pgsql"],
    single_line: Some("--"),
    multi_line: Some(("/*", "*/")),
    string_delimiters: &['"', '\''],
};

static LUA: Descriptor = Descriptor {
    extensions: &["lua"],
    single_line: Some("--"),
    multi_line: Some(("--[[", "]]")),
    string_delimiters: &['"', '\''],
};

static POWERSHELL: Descriptor = Descriptor {
    extensions: &["ps1", "psm1", "psd1"],
    single_line: Some("#"),
    multi_line: Some(("<#", "#>")),
    string_delimiters: &['"', '\''],
};

static YAML: Descriptor = Descriptor {
    extensions: &["yaml", "yml"],
    single_line: Some("#"),
    multi_line: None,
    string_delimiters: &['"', '\''],
};

static PERL: Descriptor = Descriptor {
    extensions: &["pl", "pm", "t"],
    single_line: Some("#"),
    multi_line: Some(("=pod", "=cut")),
    string_delimiters: &['"', '\'', '`'],
};

static R: Descriptor = Descriptor {
    extensions: &["r"],
    single_line: Some("#"),
    multi_line: None,
    string_delimiters: &['"', '\''],
};

static HASKELL: Descriptor = Descriptor {
    extensions: &["hs", "lhs"],
    single_line: Some("--"),
    multi_line: Some(("{-", "-}")),
    string_delimiters: &['"', '\''],
};

static BATCH: Descriptor = Descriptor {
    extensions: &["bat", "cmd"],
    single_line: Some("REM"),
    multi_line: None,
    string_delimiters: &['"'],
};

/// A supported comment dialect.
///
/// `Unknown` labels files nothing else claims; it shares the C-style
/// descriptor, since `//` and `/* */` are the most common comment forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    CStyle,
    Shell,
    Python,
    Ruby,
    Markup,
    Css,
    Sql,
    Lua,
    PowerShell,
    Yaml,
    Perl,
    R,
    Haskell,
    Batch,
    Unknown,
}

impl Dialect {
    /// Every named dialect, in the fixed order used for extension lookup and
    /// `--list-types` output. Excludes the `Unknown` fallback label.
    pub const ALL: [Dialect; 14] = [
        Dialect::CStyle,
        Dialect::Shell,
        Dialect::Python,
        Dialect::Ruby,
        Dialect::Markup,
        Dialect::Css,
        Dialect::Sql,
        Dialect::Lua,
        Dialect::PowerShell,
        Dialect::Yaml,
        Dialect::Perl,
        Dialect::R,
        Dialect::Haskell,
        Dialect::Batch,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Dialect::CStyle => "c_style",
            Dialect::Shell => "shell",
            Dialect::Python => "python",
            Dialect::Ruby => "ruby",
            Dialect::Markup => "markup",
            Dialect::Css => "css",
            Dialect::Sql => "sql",
            Dialect::Lua => "lua",
            Dialect::PowerShell => "powershell",
            Dialect::Yaml => "yaml",
            Dialect::Perl => "perl",
            Dialect::R => "r",
            Dialect::Haskell => "haskell",
            Dialect::Batch => "batch",
            Dialect::Unknown => "unknown",
        }
    }

    pub fn descriptor(self) -> &'static Descriptor {
        match self {
            Dialect::CStyle | Dialect::Unknown => &C_STYLE,
            Dialect::Shell => &SHELL,
            Dialect::Python => &PYTHON,
            Dialect::Ruby => &RUBY,
            Dialect::Markup => &MARKUP,
            Dialect::Css => &CSS,
            Dialect::Sql => &SQL,
            Dialect::Lua => &LUA,
            Dialect::PowerShell => &POWERSHELL,
            Dialect::Yaml => &YAML,
            Dialect::Perl => &PERL,
            Dialect::R => &R,
            Dialect::Haskell => &HASKELL,
            Dialect::Batch => &BATCH,
        }
    }

    /// Look up a dialect by the name a user passes with `--type`.
    /// `"unknown"` is not accepted; it is a detection result, not a dialect.
    pub fn from_name(name: &str) -> Option<Dialect> {
        Dialect::ALL.into_iter().find(|d| d.name() == name)
    }

    /// Detect the dialect for a path from its extension (case-insensitive,
    /// first table in `ALL` order wins), falling back to a coarse
    /// content-family guess and finally to `Unknown`. Never fails.
    pub fn resolve(path: &Path) -> Dialect {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase())
            .unwrap_or_default();

        for dialect in Dialect::ALL {
            if dialect.descriptor().extensions.contains(&ext.as_str()) {
                return dialect;
            }
        }

        content_family(&ext).unwrap_or(Dialect::Unknown)
    }
}

/// Coarse content-family classification for extensions outside the dialect
/// tables, standing in for a mimetype lookup. Only the javascript and xml
/// families have well-known extensions the tables do not already cover.
fn content_family(ext: &str) -> Option<Dialect> {
    match ext {
        "mjs" | "cjs" => Some(Dialect::CStyle),
        "xsl" | "xslt" | "rss" | "rdf" | "atom" => Some(Dialect::Markup),
        _ => None,
    }
}
