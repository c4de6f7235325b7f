//! Stream setup options and the PLplot command-line option parser.
//!
//! The option table mirrors the library's own flags (`-dev`, `-o`, `-bg`,
//! ...). Parsing fills a typed [`StreamOptions`] that is later applied to a
//! stream with [`crate::PlStream::apply_options`], before `init`.
//!
//! Recognized flags are removed from the argument list so the caller can
//! inspect whatever is left for its own options.

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PlotError, PlotResult};

/// Output window geometry, `WxH[+X[+Y]]` in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Geometry {
    pub width: i32,
    pub height: i32,
    pub x_offset: i32,
    pub y_offset: i32,
}

impl FromStr for Geometry {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| PlotError::invalid_option("geometry", reason);

        let (width, rest) = s
            .split_once('x')
            .ok_or_else(|| invalid("expected WxH[+X[+Y]]"))?;
        // Empty fields are skipped, so `400x300+` and `400x300++20` parse
        let mut fields = rest.split('+').filter(|field| !field.is_empty());
        let height = fields.next().unwrap_or_default();

        let width: i32 = width.trim().parse().map_err(|_| invalid("bad width"))?;
        if width == 0 {
            return Err(invalid("width must be non-zero"));
        }
        let height: i32 = height.trim().parse().map_err(|_| invalid("bad height"))?;
        if height == 0 {
            return Err(invalid("height must be non-zero"));
        }

        let mut offset = |name: &str| -> PlotResult<i32> {
            match fields.next() {
                Some(field) => field
                    .trim()
                    .parse()
                    .map_err(|_| invalid(&format!("bad {} offset", name))),
                None => Ok(0),
            }
        };
        let x_offset = offset("x")?;
        let y_offset = offset("y")?;

        Ok(Self {
            width,
            height,
            x_offset,
            y_offset,
        })
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}+{}+{}",
            self.width, self.height, self.x_offset, self.y_offset
        )
    }
}

impl TryFrom<String> for Geometry {
    type Error = PlotError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Geometry> for String {
    fn from(geometry: Geometry) -> Self {
        geometry.to_string()
    }
}

/// Background color given as hex `rrggbb` (`0` is black, `FFFFFF` white)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb {
        r: 0xFF,
        g: 0xFF,
        b: 0xFF,
    };
}

impl FromStr for Rgb {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.is_empty() || hex.len() > 6 {
            return Err(PlotError::invalid_option("bg", "expected 1 to 6 hex digits"));
        }
        let value = u32::from_str_radix(hex, 16)
            .map_err(|_| PlotError::invalid_option("bg", format!("'{}' is not hexadecimal", s)))?;
        Ok(Self {
            r: ((value & 0xFF0000) >> 16) as u8,
            g: ((value & 0x00FF00) >> 8) as u8,
            b: (value & 0x0000FF) as u8,
        })
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = PlotError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(rgb: Rgb) -> Self {
        rgb.to_string()
    }
}

/// Settings applied to a stream before it is initialized.
/// Unset fields keep the library defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamOptions {
    pub device: Option<String>,
    pub output_file: Option<String>,
    pub geometry: Option<Geometry>,
    pub aspect: Option<f64>,
    /// 0 and 2 are landscape, 1 and 3 portrait
    pub orientation: Option<i32>,
    pub pen_width: Option<f64>,
    pub color: bool,
    pub background: Option<Rgb>,
    pub family: bool,
    /// Size of each family member file in MB
    pub family_file_size_mb: Option<f64>,
    pub no_pause: bool,
    pub subpages_x: Option<i32>,
    pub subpages_y: Option<i32>,
    /// Bytes sent before output is flushed
    pub bufmax: Option<i32>,
    /// Name of the plot server process
    pub server_name: Option<String>,
    /// Name of the container window the server draws into
    pub window_name: Option<String>,
    /// Tcl command run when the server starts
    pub tcl_command: Option<String>,
    /// Extra directories the server autoloads from
    pub auto_path: Option<String>,
}

impl StreamOptions {
    /// Process one option and its argument, e.g. `("dev", "svg")`.
    /// A leading `-` on the name is accepted.
    pub fn set_option(&mut self, name: &str, value: &str) -> PlotResult<()> {
        let name = name.strip_prefix('-').unwrap_or(name);
        let spec =
            find_option(name).ok_or_else(|| PlotError::UnknownOption(format!("-{}", name)))?;
        let arg = if spec.takes_arg { Some(value) } else { None };
        self.apply(spec.name, arg).map(|_| ())
    }

    /// Family file size converted to bytes
    pub fn family_file_bytes(&self) -> PlotResult<Option<i32>> {
        match self.family_file_size_mb {
            None => Ok(None),
            Some(mb) => {
                let bytes = (1.0e6 * mb) as i32;
                if bytes == 0 {
                    return Err(PlotError::invalid_option("fsiz", "size must be non-zero"));
                }
                Ok(Some(bytes))
            }
        }
    }

    /// Merge `other` on top of `self`: set fields of `other` win
    pub fn merged_with(&self, other: &StreamOptions) -> StreamOptions {
        StreamOptions {
            device: other.device.clone().or_else(|| self.device.clone()),
            output_file: other.output_file.clone().or_else(|| self.output_file.clone()),
            geometry: other.geometry.or(self.geometry),
            aspect: other.aspect.or(self.aspect),
            orientation: other.orientation.or(self.orientation),
            pen_width: other.pen_width.or(self.pen_width),
            color: self.color || other.color,
            background: other.background.or(self.background),
            family: self.family || other.family,
            family_file_size_mb: other.family_file_size_mb.or(self.family_file_size_mb),
            no_pause: self.no_pause || other.no_pause,
            subpages_x: other.subpages_x.or(self.subpages_x),
            subpages_y: other.subpages_y.or(self.subpages_y),
            bufmax: other.bufmax.or(self.bufmax),
            server_name: other.server_name.clone().or_else(|| self.server_name.clone()),
            window_name: other.window_name.clone().or_else(|| self.window_name.clone()),
            tcl_command: other.tcl_command.clone().or_else(|| self.tcl_command.clone()),
            auto_path: other.auto_path.clone().or_else(|| self.auto_path.clone()),
        }
    }

    fn apply(&mut self, name: &str, arg: Option<&str>) -> PlotResult<Action> {
        let value = || arg.unwrap_or_default();
        match name {
            "h" => return Ok(Action::Help),
            "v" => return Ok(Action::Version),
            "showall" => return Ok(Action::ShowAll),
            "dev" => self.device = Some(value().to_string()),
            "o" | "display" => self.output_file = Some(value().to_string()),
            "px" => self.subpages_x = Some(parse_number(name, value())?),
            "py" => self.subpages_y = Some(parse_number(name, value())?),
            "geometry" | "geo" => self.geometry = Some(value().parse()?),
            "a" => self.aspect = Some(parse_number(name, value())?),
            "ori" => self.orientation = Some(parse_number(name, value())?),
            "width" => {
                let width: f64 = parse_number(name, value())?;
                if width == 0.0 {
                    return Err(PlotError::invalid_option(name, "width must be non-zero"));
                }
                self.pen_width = Some(width);
            }
            "color" => self.color = true,
            "bg" => self.background = Some(value().parse()?),
            "fam" => self.family = true,
            "fsiz" => {
                let mb: f64 = parse_number(name, value())?;
                if (1.0e6 * mb) as i32 == 0 {
                    return Err(PlotError::invalid_option(name, "size must be non-zero"));
                }
                self.family_file_size_mb = Some(mb);
            }
            "np" => self.no_pause = true,
            "bufmax" => self.bufmax = Some(parse_number(name, value())?),
            "plserver" => self.server_name = Some(value().to_string()),
            "plwindow" => self.window_name = Some(value().to_string()),
            "tcl_cmd" => self.tcl_command = Some(value().to_string()),
            "auto_path" => self.auto_path = Some(value().to_string()),
            other => return Err(PlotError::UnknownOption(format!("-{}", other))),
        }
        Ok(Action::Set)
    }
}

fn parse_number<T: FromStr>(option: &str, value: &str) -> PlotResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| PlotError::invalid_option(option, format!("'{}' is not a number", value)))
}

/// Result of processing one recognized option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Set,
    Help,
    Version,
    ShowAll,
}

/// One entry of the option table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: &'static str,
    pub takes_arg: bool,
    /// Hidden from usage text unless `SHOWALL` is set
    pub invisible: bool,
    pub syntax: &'static str,
    pub description: &'static str,
}

const fn opt(
    name: &'static str,
    takes_arg: bool,
    invisible: bool,
    syntax: &'static str,
    description: &'static str,
) -> OptionSpec {
    OptionSpec {
        name,
        takes_arg,
        invisible,
        syntax,
        description,
    }
}

pub const OPTION_TABLE: &[OptionSpec] = &[
    opt("h", false, false, "-h", "Print out this message"),
    opt("v", false, false, "-v", "Print out the PLplot library version number"),
    opt("dev", true, false, "-dev name", "Output device name"),
    opt("showall", false, true, "-showall", "Turns on invisible options"),
    opt("o", true, false, "-o name", "Output filename"),
    opt("display", true, false, "-display name", "X server to contact"),
    opt("px", true, false, "-px number", "Plots per page in x"),
    opt("py", true, false, "-py number", "Plots per page in y"),
    opt(
        "geometry",
        true,
        false,
        "-geometry geom",
        "Window size, in pixels (e.g. -geometry 400x300)",
    ),
    opt(
        "geo",
        true,
        true,
        "-geo geom",
        "Window size, in pixels (e.g. -geo 400x300)",
    ),
    opt("a", true, false, "-a aspect", "Plot aspect ratio"),
    opt(
        "ori",
        true,
        false,
        "-ori orient",
        "Plot orientation (0,2=landscape, 1,3=portrait)",
    ),
    opt(
        "width",
        true,
        false,
        "-width width",
        "Default pen width (1 <= width <= 10)",
    ),
    opt(
        "color",
        false,
        false,
        "-color",
        "Enables color output (e.g. for PS driver)",
    ),
    opt(
        "bg",
        true,
        false,
        "-bg color",
        "Background color (0=black, FFFFFF=white)",
    ),
    opt("fam", false, false, "-fam", "Create a family of output files"),
    opt(
        "fsiz",
        true,
        false,
        "-fsiz size",
        "Output family file size in MB (e.g. -fsiz 1.0)",
    ),
    opt("np", false, false, "-np", "No pause between pages"),
    opt(
        "bufmax",
        true,
        true,
        "-bufmax",
        "bytes sent before flushing output",
    ),
    opt(
        "plserver",
        true,
        true,
        "-plserver name",
        "Name of plplot server",
    ),
    opt(
        "plwindow",
        true,
        true,
        "-plwindow name",
        "Name of plplot container window",
    ),
    opt(
        "tcl_cmd",
        true,
        true,
        "-tcl_cmd command",
        "TCL command string run at startup",
    ),
    opt(
        "auto_path",
        true,
        true,
        "-auto_path dir",
        "Additional directory(s) to autoload",
    ),
];

const NOTES: &[&str] = &[
    "All parameters must be white-space delimited.  Some options are driver",
    "dependent.  Please see the PLplot reference document for more detail.",
];

pub fn find_option(name: &str) -> Option<&'static OptionSpec> {
    OPTION_TABLE.iter().find(|spec| spec.name == name)
}

/// Parser mode bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseMode(u32);

impl ParseMode {
    pub const PARTIAL: ParseMode = ParseMode(0);
    /// Unrecognized arguments are an error
    pub const FULL: ParseMode = ParseMode(0x0001);
    /// Errors carry no usage text
    pub const QUIET: ParseMode = ParseMode(0x0002);
    /// Keep recognized options in the remaining arguments
    pub const NODELETE: ParseMode = ParseMode(0x0004);
    pub const SHOWALL: ParseMode = ParseMode(0x0008);
    /// Caller options disable built-in options of the same name
    pub const OVERRIDE: ParseMode = ParseMode(0x0010);
    /// The first argument is not the program name
    pub const NOPROGRAM: ParseMode = ParseMode(0x0020);

    pub fn contains(self, other: ParseMode) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ParseMode {
    type Output = ParseMode;

    fn bitor(self, rhs: ParseMode) -> ParseMode {
        ParseMode(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Every argument was processed
    Complete,
    /// `-h` was given; parsing stopped there
    Help,
    /// `-v` was given; parsing stopped there
    Version,
}

/// Builds the usage text attached to a command-line error, given the
/// program name and the offending argument when there is one
pub type UsageHandler = fn(&str, Option<&str>) -> String;

/// An option from a caller-supplied table, with its argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserArg {
    pub name: &'static str,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedArgs {
    pub options: StreamOptions,
    /// Program name (unless `NOPROGRAM`) followed by unprocessed arguments
    pub remaining: Vec<String>,
    pub outcome: ParseOutcome,
    pub show_all: bool,
    /// Matches from the caller's table, in command-line order
    pub user: Vec<UserArg>,
}

/// Parse PLplot options out of `args`
pub fn parse_args<I, S>(args: I, mode: ParseMode) -> PlotResult<ParsedArgs>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    parse_args_with(args, mode, &[], usage)
}

/// Parse PLplot options and the caller's own `user_table` in one pass.
///
/// Built-in options win a name clash unless `mode` has `OVERRIDE`. Unless
/// `mode` has `QUIET`, an unknown option (in `FULL` mode) or a missing
/// argument comes back as [`PlotError::Usage`] with the text from
/// `usage_handler`.
pub fn parse_args_with<I, S>(
    args: I,
    mode: ParseMode,
    user_table: &[OptionSpec],
    usage_handler: UsageHandler,
) -> PlotResult<ParsedArgs>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut options = StreamOptions::default();
    let parsed = Parser {
        mode,
        user_table,
        usage_handler,
    }
    .run(&mut options, args)?;
    Ok(ParsedArgs {
        options,
        remaining: parsed.remaining,
        outcome: parsed.outcome,
        show_all: parsed.show_all,
        user: parsed.user,
    })
}

/// Like [`parse_args`], updating existing options in place
pub fn parse_args_into<I, S>(
    options: &mut StreamOptions,
    args: I,
    mode: ParseMode,
) -> PlotResult<(Vec<String>, ParseOutcome, bool)>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let parsed = Parser {
        mode,
        user_table: &[],
        usage_handler: usage,
    }
    .run(options, args)?;
    Ok((parsed.remaining, parsed.outcome, parsed.show_all))
}

/// Program name used in usage text when `NOPROGRAM` is set
const UNNAMED_PROGRAM: &str = "<user program>";

#[derive(Clone, Copy)]
enum Matched<'t> {
    Builtin(&'static OptionSpec),
    User(&'t OptionSpec),
}

impl Matched<'_> {
    fn spec(&self) -> &OptionSpec {
        match self {
            Matched::Builtin(spec) => *spec,
            Matched::User(spec) => *spec,
        }
    }
}

struct Parsed {
    remaining: Vec<String>,
    outcome: ParseOutcome,
    show_all: bool,
    user: Vec<UserArg>,
}

struct Parser<'t> {
    mode: ParseMode,
    user_table: &'t [OptionSpec],
    usage_handler: UsageHandler,
}

impl<'t> Parser<'t> {
    fn lookup(&self, arg: &str) -> Option<Matched<'t>> {
        let name = arg.strip_prefix('-')?;
        let user = self.user_table.iter().find(|spec| spec.name == name);
        match (find_option(name), user) {
            (Some(_), Some(user)) if self.mode.contains(ParseMode::OVERRIDE) => {
                Some(Matched::User(user))
            }
            (Some(builtin), _) => Some(Matched::Builtin(builtin)),
            (None, Some(user)) => Some(Matched::User(user)),
            (None, None) => None,
        }
    }

    fn fail(&self, error: PlotError, program: &str, bad: Option<&str>) -> PlotError {
        if self.mode.contains(ParseMode::QUIET) {
            return error;
        }
        PlotError::Usage {
            error: Box::new(error),
            usage: (self.usage_handler)(program, bad),
        }
    }

    fn run<I, S>(&self, options: &mut StreamOptions, args: I) -> PlotResult<Parsed>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mode = self.mode;
        let mut args = args.into_iter().map(Into::into).peekable();
        let mut parsed = Parsed {
            remaining: Vec::new(),
            outcome: ParseOutcome::Complete,
            show_all: mode.contains(ParseMode::SHOWALL),
            user: Vec::new(),
        };
        let keep_all = mode.contains(ParseMode::NODELETE);

        let mut program = UNNAMED_PROGRAM.to_string();
        if !mode.contains(ParseMode::NOPROGRAM) {
            if let Some(name) = args.next() {
                program = name.clone();
                parsed.remaining.push(name);
            }
        }

        while let Some(arg) = args.next() {
            let Some(matched) = self.lookup(&arg) else {
                if mode.contains(ParseMode::FULL) {
                    let error = PlotError::UnknownOption(arg.clone());
                    return Err(self.fail(error, &program, Some(arg.as_str())));
                }
                parsed.remaining.push(arg);
                continue;
            };
            let spec = matched.spec();

            let value = if spec.takes_arg {
                match args.next_if(|next| !looks_like_flag(next)) {
                    Some(value) => Some(value),
                    None => {
                        let error = PlotError::MissingArgument(spec.name.to_string());
                        return Err(self.fail(error, &program, None));
                    }
                }
            } else {
                None
            };

            if keep_all {
                parsed.remaining.push(arg);
                parsed.remaining.extend(value.iter().cloned());
            }

            let action = match matched {
                Matched::User(spec) => {
                    parsed.user.push(UserArg {
                        name: spec.name,
                        value,
                    });
                    continue;
                }
                Matched::Builtin(spec) => options.apply(spec.name, value.as_deref())?,
            };

            match action {
                Action::Set => {}
                Action::ShowAll => parsed.show_all = true,
                Action::Help | Action::Version => {
                    if keep_all {
                        parsed.remaining.extend(args);
                    }
                    parsed.outcome = if action == Action::Help {
                        ParseOutcome::Help
                    } else {
                        ParseOutcome::Version
                    };
                    return Ok(parsed);
                }
            }
        }

        Ok(parsed)
    }
}

/// `-` followed by a letter; negative numbers are valid arguments
fn looks_like_flag(arg: &str) -> bool {
    let mut chars = arg.chars();
    chars.next() == Some('-') && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
}

fn visible(show_all: bool) -> impl Iterator<Item = &'static OptionSpec> {
    OPTION_TABLE
        .iter()
        .filter(move |spec| show_all || !spec.invisible)
}

/// Short syntax summary, wrapped before column 80
pub fn syntax(show_all: bool) -> String {
    let mut out = String::from("PLplot options:");
    let mut col = 80;
    for spec in visible(show_all) {
        let len = 3 + spec.syntax.len();
        if col + len > 79 {
            out.push_str("\n   ");
            col = 3;
        }
        out.push_str(&format!(" [{}]", spec.syntax));
        col += len;
    }
    out.push('\n');
    out
}

/// Long help: one line per option, invisible ones marked with `*`
pub fn help(show_all: bool) -> String {
    let mut out = String::from("PLplot options:\n");
    for spec in visible(show_all) {
        let marker = if spec.invisible { " *  " } else { "    " };
        out.push_str(&format!("{}{:<20} {}\n", marker, spec.syntax, spec.description));
    }
    out.push('\n');
    for line in NOTES {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Usage message, optionally naming the offending option
pub fn usage(program: &str, bad_option: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(bad) = bad_option {
        out.push_str(&format!("{}:  bad command line option \"{}\"\n\n", program, bad));
    }
    out.push_str(&format!("Usage:\n        {} [PLplot options]\n\n", program));
    out.push_str(&syntax(false));
    out.push_str(&format!("\nType {} -h for a full description.\n", program));
    out
}
