//! Style functions callable from property values.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use xfdashboard_core::Color;
use xfdashboard_core::color::{parse_alpha, parse_channel};
use xfdashboard_core::unquote;

use crate::icon_theme::IconResolver;
use crate::{Error, Result};

/// Environment a style function runs in.
#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionContext<'a> {
    /// Root directory of the theme, for relative file lookups.
    pub theme_dir: Option<&'a Path>,
    /// Icon theme used by `try_icons()`.
    pub icons: Option<&'a IconResolver>,
}

/// Signature of a style function: already-resolved arguments in, text out.
pub type StyleFunction = fn(&FunctionContext<'_>, &[String]) -> Result<String>;

/// Style functions by name.
///
/// [`Default`] holds the built-in functions: `rgb`, `rgba`, `mix`,
/// `lighter`, `darker`, `shade`, `alpha` and `try_icons`.
#[derive(Clone)]
pub struct FunctionTable {
    functions: HashMap<String, StyleFunction>,
}

impl FunctionTable {
    /// A table without any function.
    pub fn empty() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Register `function` under `name`, returning the one it replaces.
    pub fn register(&mut self, name: impl Into<String>, function: StyleFunction) -> Option<StyleFunction> {
        self.functions.insert(name.into(), function)
    }

    /// Look up a function.
    pub fn get(&self, name: &str) -> Option<StyleFunction> {
        self.functions.get(name).copied()
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for FunctionTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.register("rgb", rgb);
        table.register("rgba", rgba);
        table.register("mix", mix);
        table.register("lighter", lighter);
        table.register("darker", darker);
        table.register("shade", shade);
        table.register("alpha", alpha);
        table.register("try_icons", try_icons);
        table
    }
}

impl fmt::Debug for FunctionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionTable")
            .field("functions", &self.names())
            .finish()
    }
}

fn expect_args<'a, const N: usize>(function: &str, args: &'a [String]) -> Result<&'a [String; N]> {
    args.try_into().map_err(|_| {
        Error::function(
            function,
            format!("expected {N} argument(s), got {}", args.len()),
        )
    })
}

fn color_arg(function: &str, text: &str) -> Result<Color> {
    Color::parse(text).ok_or_else(|| Error::function(function, format!("'{text}' is not a color")))
}

fn factor_arg(function: &str, text: &str) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .ok_or_else(|| Error::function(function, format!("'{text}' is not a number")))
}

fn channel_arg(function: &str, text: &str) -> Result<u8> {
    parse_channel(text).ok_or_else(|| {
        Error::function(
            function,
            format!("component '{text}' is not in 0-255 or 0%-100%"),
        )
    })
}

fn rgb(_: &FunctionContext<'_>, args: &[String]) -> Result<String> {
    let [r, g, b] = expect_args("rgb", args)?;
    let color = Color::rgb(
        channel_arg("rgb", r)?,
        channel_arg("rgb", g)?,
        channel_arg("rgb", b)?,
    );
    Ok(color.to_hex_string())
}

fn rgba(_: &FunctionContext<'_>, args: &[String]) -> Result<String> {
    let [r, g, b, a] = expect_args("rgba", args)?;
    let alpha = parse_alpha(a)
        .ok_or_else(|| Error::function("rgba", format!("alpha '{a}' is not in 0.0-1.0")))?;
    let color = Color::new(
        channel_arg("rgba", r)?,
        channel_arg("rgba", g)?,
        channel_arg("rgba", b)?,
        alpha,
    );
    Ok(color.to_hex_string())
}

fn mix(_: &FunctionContext<'_>, args: &[String]) -> Result<String> {
    let [first, second, factor] = expect_args("mix", args)?;
    let factor = factor_arg("mix", factor)?;
    if !(0.0..=1.0).contains(&factor) {
        return Err(Error::function(
            "mix",
            format!("factor {factor} is outside 0.0-1.0"),
        ));
    }
    let mixed = color_arg("mix", first)?.mix(color_arg("mix", second)?, factor);
    Ok(mixed.to_hex_string())
}

fn lighter(_: &FunctionContext<'_>, args: &[String]) -> Result<String> {
    let [color] = expect_args("lighter", args)?;
    Ok(color_arg("lighter", color)?.lighten().to_hex_string())
}

fn darker(_: &FunctionContext<'_>, args: &[String]) -> Result<String> {
    let [color] = expect_args("darker", args)?;
    Ok(color_arg("darker", color)?.darken().to_hex_string())
}

fn shade(_: &FunctionContext<'_>, args: &[String]) -> Result<String> {
    let [color, factor] = expect_args("shade", args)?;
    let factor = factor_arg("shade", factor)?;
    Ok(color_arg("shade", color)?.shade(factor).to_hex_string())
}

fn alpha(_: &FunctionContext<'_>, args: &[String]) -> Result<String> {
    let [color, factor] = expect_args("alpha", args)?;
    let factor = factor_arg("alpha", factor)?;
    Ok(color_arg("alpha", color)?
        .with_alpha_factor(factor)
        .to_hex_string())
}

/// First candidate that names an existing file or a known icon, else `""`.
fn try_icons(context: &FunctionContext<'_>, args: &[String]) -> Result<String> {
    if args.is_empty() {
        return Err(Error::function("try_icons", "expected at least one icon name"));
    }

    for candidate in args {
        let name = unquote(candidate);
        if name.is_empty() {
            continue;
        }

        let path = Path::new(name);
        let found = if path.is_absolute() {
            path.exists()
        } else {
            context.theme_dir.is_some_and(|dir| dir.join(path).exists())
                || context.icons.is_some_and(|icons| icons.has_icon(name))
        };

        if found {
            return Ok(candidate.clone());
        }
    }

    tracing::debug!(target: "xfdashboard_theme::eval", candidates = ?args, "no icon found");
    Ok("\"\"".to_string())
}
