//! Rendering of the shell script printed by `zpm load`.

use zpm_plugins::{LoadScript, PluginResult};

/// Compdump file per zsh version, as Oh My Zsh names it.
const COMPDUMP: &str = r#"ZSH_COMPDUMP="${ZDOTDIR:-${HOME}}/.zcompdump-${SHORT_HOST}-${ZSH_VERSION}""#;
const AUTOLOAD: &str = "autoload -U compaudit compinit";
const COMPINIT: &str = r#"compinit -u -C -d "${ZSH_COMPDUMP}""#;

/// A rendered load script and the plugins that could not contribute to it.
#[derive(Debug, Default)]
pub(crate) struct Rendered {
    /// Script lines, in execution order.
    pub(crate) lines: Vec<String>,
    /// One message per plugin whose load failed.
    pub(crate) errors: Vec<String>,
}

impl Rendered {
    /// The script as a single string with a trailing newline.
    pub(crate) fn script(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

/// Merge per-plugin scripts, in load order, into one shell script.
///
/// `fpath` entries are added before `compinit` runs so that completions are
/// picked up; plugin statements follow. Plugins that fail to load are left
/// out and reported in [`Rendered::errors`].
pub(crate) fn render<'a, I>(scripts: I) -> Rendered
where
    I: IntoIterator<Item = (&'a str, PluginResult<LoadScript>)>,
{
    let mut merged = LoadScript::default();
    let mut errors = Vec::new();

    for (name, script) in scripts {
        match script {
            Ok(script) => merged.extend(script),
            Err(e) => errors.push(format!("error loading plugin {name}: {e}")),
        }
    }

    let mut fpath = String::from("fpath=(");
    for entry in &merged.fpath {
        fpath.push_str(entry);
        fpath.push(' ');
    }
    fpath.push_str("$fpath)");

    let mut lines = vec![COMPDUMP.to_owned(), AUTOLOAD.to_owned(), fpath, COMPINIT.to_owned()];
    lines.extend(merged.exec);

    Rendered { lines, errors }
}
