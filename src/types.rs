use std::fmt;
use std::str::FromStr;

/// A command line split into a program and its arguments.
///
/// Commands are written the way a user types them (`"cargo build --release"`)
/// and split on whitespace. No shell is involved: quoting and globbing are not
/// interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
}

impl CommandSpec {
    pub fn new<P, I, A>(program: P, args: I) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl FromStr for CommandSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();
        let program = tokens
            .next()
            .ok_or_else(|| "command must not be empty".to_string())?;
        Ok(CommandSpec::new(program, tokens))
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Which slot of the supervisor a process occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessRole {
    Build,
    Application,
}

impl fmt::Display for ProcessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessRole::Build => f.write_str("build"),
            ProcessRole::Application => f.write_str("app"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_program_and_arguments() {
        let spec: CommandSpec = "go build  -o app ./cmd".parse().unwrap();
        assert_eq!(spec.program(), "go");
        assert_eq!(spec.args(), ["build", "-o", "app", "./cmd"]);
        assert_eq!(spec.to_string(), "go build -o app ./cmd");
    }

    #[test]
    fn blank_command_is_rejected() {
        assert!("   ".parse::<CommandSpec>().is_err());
        assert!("".parse::<CommandSpec>().is_err());
    }

    #[test]
    fn single_word_command_has_no_args() {
        let spec: CommandSpec = "./my-app".parse().unwrap();
        assert_eq!(spec.program(), "./my-app");
        assert!(spec.args().is_empty());
    }
}
