//! Numbered menu loop. Generic over its input and output so sessions can be scripted.

use roster_core::{Record, RecordDraft, RecordManager, RecordPatch};
use std::io::{self, BufRead, Write};

const BANNER_WIDTH: usize = 30;

enum Flow {
    Continue,
    Exit,
}

pub struct Menu<'a, R, W> {
    manager: &'a mut RecordManager,
    input: R,
    output: W,
    eof: bool,
}

/// Digits only; anything else (including a sign) is rejected.
fn parse_age(s: &str) -> Option<i64> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn non_blank(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(manager: &'a mut RecordManager, input: R, output: W) -> Self {
        Self {
            manager,
            input,
            output,
            eof: false,
        }
    }

    /// Runs until "Save and Exit" is chosen or input ends (which also saves).
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            self.print_menu()?;
            let choice = self.prompt("Select operation (1-6): ")?;
            if self.eof && choice.is_empty() {
                self.save_and_exit()?;
                return Ok(());
            }
            let flow = match choice.as_str() {
                "1" => self.add()?,
                "2" => self.query()?,
                "3" => self.modify()?,
                "4" => self.delete()?,
                "5" => self.show_all()?,
                "6" => self.save_and_exit()?,
                _ => {
                    writeln!(
                        self.output,
                        "Invalid choice. Please enter a number between 1 and 6."
                    )?;
                    Flow::Continue
                }
            };
            if let Flow::Exit = flow {
                return Ok(());
            }
        }
    }

    fn print_menu(&mut self) -> io::Result<()> {
        let rule = "=".repeat(BANNER_WIDTH);
        writeln!(self.output, "\n{}", rule)?;
        writeln!(self.output, "   Student Management System")?;
        writeln!(self.output, "{}", rule)?;
        writeln!(self.output, "1. Add Student")?;
        writeln!(self.output, "2. Query Student (with Natural Language)")?;
        writeln!(self.output, "3. Modify Student")?;
        writeln!(self.output, "4. Delete Student")?;
        writeln!(self.output, "5. Show All")?;
        writeln!(self.output, "6. Save and Exit")?;
        writeln!(self.output, "{}", rule)
    }

    /// Prints `label` and reads one trimmed line. Returns "" once input is exhausted.
    fn prompt(&mut self, label: &str) -> io::Result<String> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            self.eof = true;
        }
        Ok(line.trim().to_string())
    }

    fn print_records(&mut self, records: &[Record]) -> io::Result<()> {
        for record in records {
            writeln!(self.output, "{}", record)?;
        }
        Ok(())
    }

    fn add(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "\n--- Add Student ---")?;
        let id = self.prompt("Enter Student ID (e.g., S101): ")?;
        let name = self.prompt("Enter Name: ")?;
        let age = parse_age(&self.prompt("Enter Age (integer): ")?).unwrap_or(0);
        let gender = self.prompt("Enter Gender (Male/Female): ")?;
        let major = self.prompt("Enter Major: ")?;
        match self.manager.add(RecordDraft::new(id, name, age, gender, major)) {
            Ok(record) => writeln!(self.output, "Student {} added successfully!", record.id)?,
            Err(e) => writeln!(self.output, "Error: {}", e)?,
        }
        Ok(Flow::Continue)
    }

    fn query(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "\n--- Query Student (Natural Language) ---")?;
        let text = self.prompt("Enter query (e.g., 'all females over 20'): ")?;
        match self.manager.query(&text) {
            Ok(outcome) => {
                writeln!(self.output, "\nUnderstood: {}", outcome.query_params)?;
                writeln!(self.output, "Query Results:")?;
                if outcome.students.is_empty() {
                    writeln!(self.output, "No students matched the query criteria.")?;
                } else {
                    self.print_records(&outcome.students)?;
                }
            }
            Err(e) => writeln!(self.output, "Error: {}", e)?,
        }
        Ok(Flow::Continue)
    }

    fn modify(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "\n--- Modify Student ---")?;
        let id = self.prompt("Enter Student ID to modify: ")?;
        let current = match self.manager.get(&id) {
            Ok(record) => record.clone(),
            Err(e) => {
                writeln!(self.output, "Error: {}", e)?;
                return Ok(Flow::Continue);
            }
        };
        writeln!(self.output, "Current data:\n{}", current)?;
        writeln!(self.output, "Enter new information (press enter to keep unchanged):")?;

        let patch = RecordPatch {
            name: non_blank(self.prompt(&format!("New Name ({}): ", current.name))?),
            age: parse_age(&self.prompt(&format!("New Age ({}): ", current.age))?),
            gender: non_blank(self.prompt(&format!("New Gender ({}): ", current.gender))?),
            major: non_blank(self.prompt(&format!("New Major ({}): ", current.major))?),
        };

        match self.manager.patch(&id, patch) {
            Ok(_) => writeln!(self.output, "Modification successful.")?,
            Err(e) => writeln!(self.output, "Error: {}", e)?,
        }
        Ok(Flow::Continue)
    }

    fn delete(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "\n--- Delete Student ---")?;
        let id = self.prompt("Enter Student ID to delete: ")?;
        match self.manager.delete(&id) {
            Ok(_) => writeln!(self.output, "Student {} deleted successfully.", id)?,
            Err(e) => writeln!(self.output, "Error: {}", e)?,
        }
        Ok(Flow::Continue)
    }

    fn show_all(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "\n--- All Students ---")?;
        let records: Vec<Record> = self.manager.all().into_iter().cloned().collect();
        if records.is_empty() {
            writeln!(self.output, "No students in the system.")?;
        } else {
            self.print_records(&records)?;
        }
        Ok(Flow::Continue)
    }

    fn save_and_exit(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "\nSaving data and exiting...")?;
        match self.manager.save() {
            Ok(()) => writeln!(self.output, "Data saved. Goodbye!")?,
            Err(e) => writeln!(self.output, "Data save failed during exit: {}", e)?,
        }
        Ok(Flow::Exit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::{KeywordQueryAgent, MemoryStorage};
    use std::io::Cursor;
    use std::sync::Arc;

    fn run_script(manager: &mut RecordManager, script: &str) -> String {
        let mut out = Vec::new();
        Menu::new(manager, Cursor::new(script.as_bytes().to_vec()), &mut out)
            .run()
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    fn manager(storage: Arc<MemoryStorage>) -> RecordManager {
        RecordManager::open(storage, Arc::new(KeywordQueryAgent::new()))
    }

    #[test]
    fn add_list_and_save() {
        let storage = Arc::new(MemoryStorage::new());
        let mut m = manager(Arc::clone(&storage));
        let out = run_script(&mut m, "1\nS1\nAlice\n25\nFemale\nFinance\n5\n6\n");
        assert!(out.contains("Student S1 added successfully!"));
        assert!(out.contains("ID: S1\tName: Alice\tAge: 25\tGender: Female\tMajor: Finance"));
        assert!(out.contains("Data saved. Goodbye!"));
        assert!(storage.snapshot().contains_key("S1"));
    }

    #[test]
    fn non_numeric_age_is_rejected_by_validation() {
        let mut m = manager(Arc::new(MemoryStorage::new()));
        let out = run_script(&mut m, "1\nS1\nAlice\nabc\nFemale\nFinance\n6\n");
        assert!(out.contains("Error: Age must be an integer between 1-150."));
        assert!(m.is_empty());
    }

    #[test]
    fn modify_keeps_blank_fields() {
        let mut m = manager(Arc::new(MemoryStorage::new()));
        m.add(RecordDraft::new("S1", "Alice", 25, "Female", "Finance")).unwrap();
        let out = run_script(&mut m, "3\nS1\n\n26\n\nLaw\n6\n");
        assert!(out.contains("Modification successful."));
        let record = m.get("S1").unwrap();
        assert_eq!(record.name, "Alice");
        assert_eq!(record.age, 26);
        assert_eq!(record.major, "Law");
    }

    #[test]
    fn modify_ignores_non_numeric_age() {
        let mut m = manager(Arc::new(MemoryStorage::new()));
        m.add(RecordDraft::new("S1", "Alice", 25, "Female", "Finance")).unwrap();
        let out = run_script(&mut m, "3\nS1\nAlicia\nold\nMale\n\n6\n");
        assert!(out.contains("Modification successful."));
        let record = m.get("S1").unwrap();
        assert_eq!(record.name, "Alicia");
        assert_eq!(record.age, 25);
        assert_eq!(record.gender.as_str(), "Male");
        assert_eq!(record.major, "Finance");
    }

    #[test]
    fn query_prints_matches_and_errors() {
        let mut m = manager(Arc::new(MemoryStorage::new()));
        m.add(RecordDraft::new("S1", "Alice", 25, "Female", "Finance")).unwrap();
        m.add(RecordDraft::new("S2", "Bob", 17, "Male", "Computer Science")).unwrap();
        let script = "2\nall females over 20\n2\nwho is tall\n2\nboys over 20\n6\n";
        let out = run_script(&mut m, script);
        assert!(out.contains("Understood: {gender: Female, age_min: 20}"));
        assert!(out.contains("ID: S1\tName: Alice"));
        assert!(out.contains("Error: Could not extract"));
        assert!(out.contains("No students matched the query criteria."));
    }

    #[test]
    fn delete_unknown_prints_error() {
        let mut m = manager(Arc::new(MemoryStorage::new()));
        let out = run_script(&mut m, "4\nS9\n6\n");
        assert!(out.contains("Error: No student found with ID S9."));
    }

    #[test]
    fn invalid_choice_then_eof_saves() {
        let storage = Arc::new(MemoryStorage::new());
        let mut m = manager(Arc::clone(&storage));
        let out = run_script(&mut m, "9\n");
        assert!(out.contains("Invalid choice."));
        assert!(out.contains("Data saved. Goodbye!"));
        assert_eq!(storage.save_count(), 1);
    }
}
