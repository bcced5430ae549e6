/// One line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Confirm a city typed directly, bypassing the search box
    Add(String),
    /// Replace the search box contents
    Type(String),
    Down,
    Up,
    Enter,
    /// Pick a suggestion by its 1-based row number
    Pick(usize),
    /// Confirm whatever is in the search box
    Submit,
    Remove(String),
    Clear,
    Units,
    Show,
    Help,
    Quit,
}

impl Command {
    /// Parse a console line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (word, rest) = match line.trim_start().split_once(' ') {
            Some((word, rest)) => (word, rest.trim()),
            None => (line.trim(), ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "" => return Ok(None),
            "add" => Command::Add(rest.to_string()),
            "type" => Command::Type(rest.to_string()),
            "down" => Command::Down,
            "up" => Command::Up,
            "enter" => Command::Enter,
            "pick" => {
                let row: usize = rest
                    .parse()
                    .map_err(|_| format!("pick expects a row number, got {:?}", rest))?;
                if row == 0 {
                    return Err("rows are numbered from 1".to_string());
                }
                Command::Pick(row)
            }
            "submit" => Command::Submit,
            "remove" => {
                if rest.is_empty() {
                    return Err("remove expects a city name".to_string());
                }
                Command::Remove(rest.to_string())
            }
            "clear" => Command::Clear,
            "units" => Command::Units,
            "show" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(format!("unknown command {:?}; try 'help'", other)),
        };

        Ok(Some(command))
    }
}

pub const HELP: &str = "\
Commands:
  add <city>      track a city
  type <text>     search for cities (empty text clears)
  down | up       move through suggestions
  enter           track the highlighted suggestion
  pick <n>        track suggestion number n
  submit          track the text in the search box
  remove <city>   stop tracking a city
  clear           stop tracking every city
  units           switch between Celsius and Fahrenheit
  show            print every card
  quit            exit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands_with_arguments() {
        assert_eq!(
            Command::parse("add New York"),
            Ok(Some(Command::Add("New York".into())))
        );
        assert_eq!(
            Command::parse("remove  San Jose \n"),
            Ok(Some(Command::Remove("San Jose".into())))
        );
        assert_eq!(Command::parse("pick 2"), Ok(Some(Command::Pick(2))));
        assert_eq!(Command::parse("type"), Ok(Some(Command::Type(String::new()))));
    }

    #[test]
    fn test_parse_bare_commands() {
        assert_eq!(Command::parse("DOWN"), Ok(Some(Command::Down)));
        assert_eq!(Command::parse("units"), Ok(Some(Command::Units)));
        assert_eq!(Command::parse("exit"), Ok(Some(Command::Quit)));
        assert_eq!(Command::parse("   "), Ok(None));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Command::parse("pick zero").is_err());
        assert!(Command::parse("pick 0").is_err());
        assert!(Command::parse("remove").is_err());
        assert!(Command::parse("forecast Paris").is_err());
    }
}
