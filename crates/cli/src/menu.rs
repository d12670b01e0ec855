//! Interactive menu
//!
//! Reads from any `BufRead` and writes to any `Write` so the loop can be
//! driven by tests as well as by the terminal.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use declutter_core::{Operation, Selection};

/// One line of menu input.
#[derive(Debug, PartialEq, Eq)]
pub enum MenuInput {
    /// Operations to run, deduplicated and in execution order
    Run(Vec<Operation>),
    /// The exit entry was chosen
    Exit,
    /// A token that is not a menu number
    Invalid(String),
    /// Input ended
    Eof,
}

/// Prompts for the source path. Returns `None` when nothing was entered.
pub fn prompt_path<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<Option<PathBuf>> {
    write!(output, "Enter the path to the HTML file: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let path = line.trim();

    if path.is_empty() {
        writeln!(output, "No file selected.")?;
        return Ok(None);
    }
    Ok(Some(PathBuf::from(path)))
}

/// Prints the menu and reads one line of selections.
pub fn prompt_selection<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<MenuInput> {
    writeln!(output, "\nAvailable options:")?;
    for op in Operation::ALL {
        writeln!(output, "{}. {}", op.number(), op.label())?;
    }
    writeln!(output, "{}. Exit", Selection::EXIT_NUMBER)?;
    write!(output, "\nEnter the numbers of the desired options (e.g., 0 3): ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(MenuInput::Eof);
    }
    Ok(parse_selection_line(&line))
}

/// Parses a whitespace separated list of menu numbers.
///
/// Exit wins over everything else on the line. Separating tables already
/// writes the table-free page, so removal is dropped when both are chosen.
pub fn parse_selection_line(line: &str) -> MenuInput {
    let mut ops = Vec::new();
    for token in line.split_whitespace() {
        match token.parse::<Selection>() {
            Ok(Selection::Exit) => return MenuInput::Exit,
            Ok(Selection::Run(op)) if !ops.contains(&op) => ops.push(op),
            Ok(Selection::Run(_)) => {}
            Err(_) => return MenuInput::Invalid(token.to_string()),
        }
    }

    if ops.contains(&Operation::SeparateTables) {
        ops.retain(|op| *op != Operation::RemoveTables);
    }
    ops.sort_by_key(|op| op.number());
    MenuInput::Run(ops)
}

/// Runs the menu until exit or end of input.
///
/// Each chosen operation is handed to `dispatch`, which reports its own
/// outcome. Returns how many operations were dispatched.
pub fn run_loop<R, W, F>(input: &mut R, output: &mut W, mut dispatch: F) -> io::Result<usize>
where
    R: BufRead,
    W: Write,
    F: FnMut(Operation),
{
    let mut dispatched = 0;
    loop {
        match prompt_selection(input, output)? {
            MenuInput::Run(ops) if ops.is_empty() => {
                writeln!(output, "No options selected.")?;
            }
            MenuInput::Run(ops) => {
                for op in ops {
                    dispatch(op);
                    dispatched += 1;
                }
                writeln!(output, "Process completed.")?;
            }
            MenuInput::Invalid(token) => {
                writeln!(output, "Invalid option: {}", token)?;
            }
            MenuInput::Exit | MenuInput::Eof => {
                writeln!(output, "Exiting...")?;
                return Ok(dispatched);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(input: &str) -> (Vec<Operation>, String) {
        let mut reader = Cursor::new(input.as_bytes().to_vec());
        let mut out = Vec::new();
        let mut seen = Vec::new();
        run_loop(&mut reader, &mut out, |op| seen.push(op)).unwrap();
        (seen, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_selection_line() {
        assert_eq!(
            parse_selection_line("3 0"),
            MenuInput::Run(vec![Operation::Clean, Operation::SaveContent])
        );
        assert_eq!(parse_selection_line("1 2 1"), MenuInput::Run(vec![Operation::SeparateTables]));
        assert_eq!(parse_selection_line("0 4"), MenuInput::Exit);
        assert_eq!(parse_selection_line("0 9"), MenuInput::Invalid("9".to_string()));
        assert_eq!(parse_selection_line("   "), MenuInput::Run(vec![]));
    }

    #[test]
    fn test_loop_runs_until_exit() {
        let (seen, out) = run("0 3\n1\n4\n2\n");
        assert_eq!(seen, vec![Operation::Clean, Operation::SaveContent, Operation::RemoveTables]);
        assert!(out.contains("0. Just cleaned HTML content"));
        assert!(out.contains("4. Exit"));
        assert_eq!(out.matches("Process completed.").count(), 2);
        assert!(out.ends_with("Exiting...\n"));
    }

    #[test]
    fn test_loop_stops_at_eof() {
        let (seen, out) = run("2\n");
        assert_eq!(seen, vec![Operation::SeparateTables]);
        assert!(out.ends_with("Exiting...\n"));
    }

    #[test]
    fn test_loop_reports_invalid_input() {
        let (seen, out) = run("x\n\n4\n");
        assert!(seen.is_empty());
        assert!(out.contains("Invalid option: x"));
        assert!(out.contains("No options selected."));
    }

    #[test]
    fn test_prompt_path() {
        let mut out = Vec::new();
        let path = prompt_path(&mut Cursor::new(" page.html \n"), &mut out).unwrap();
        assert_eq!(path, Some(PathBuf::from("page.html")));

        let mut out = Vec::new();
        assert_eq!(prompt_path(&mut Cursor::new("\n"), &mut out).unwrap(), None);
        assert!(String::from_utf8(out).unwrap().contains("No file selected."));
    }
}
