//! `tuoyu completions` command - print a tab-completion script
//!
//! The script covers every subcommand and flag, so survey coordinators can
//! complete `tuoyu validate ans<TAB>` or `tuoyu schema show --role <TAB>`.
//! Load it once per shell session, e.g. `eval "$(tuoyu completions bash)"`,
//! or save the output wherever the shell looks for completion files.

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use miette::Result;
use std::io::{self, Write};

use crate::cli::Cli;

#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell (bash, zsh, fish, elvish, powershell)
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn run(args: CompletionsArgs) -> Result<()> {
    write_script(args.shell, &mut io::stdout().lock());
    Ok(())
}

/// Write the completion script for `shell`, named after the `tuoyu` binary
fn write_script(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_string();
    tracing::debug!(%shell, %bin, "generating completion script");
    generate(shell, &mut cmd, bin, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(shell: Shell) -> String {
        let mut buf = Vec::new();
        write_script(shell, &mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_script_lists_survey_commands() {
        let bash = script(Shell::Bash);
        for sub in ["fill", "validate", "label", "report", "schema"] {
            assert!(bash.contains(sub), "bash script is missing {}", sub);
        }
    }

    #[test]
    fn test_fish_script_names_binary() {
        assert!(script(Shell::Fish).contains("complete -c tuoyu"));
    }
}
