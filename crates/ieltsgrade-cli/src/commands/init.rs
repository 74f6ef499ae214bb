//! The `ieltsgrade init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create ieltsgrade.toml
    if std::path::Path::new("ieltsgrade.toml").exists() {
        println!("ieltsgrade.toml already exists, skipping.");
    } else {
        std::fs::write("ieltsgrade.toml", SAMPLE_CONFIG)?;
        println!("Created ieltsgrade.toml");
    }

    // Create example attempt record
    std::fs::create_dir_all("attempts")?;
    let example_path = std::path::Path::new("attempts/example.json");
    if example_path.exists() {
        println!("attempts/example.json already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_ATTEMPT)?;
        println!("Created attempts/example.json");
    }

    println!("\nNext steps:");
    println!("  1. Export attempt records into attempts/");
    println!("  2. Run: ieltsgrade validate --attempt attempts");
    println!("  3. Run: ieltsgrade grade --attempt attempts");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# ieltsgrade configuration

parallelism = 4
output_dir = "./ieltsgrade-results"
default_format = "json"
"#;

const EXAMPLE_ATTEMPT: &str = r#"{
  "attempt_id": "example-attempt",
  "task": {
    "id": "example-passage",
    "title": "Example Passage",
    "skill": "reading",
    "groups": [
      {
        "group_id": "g1",
        "section_order": 1,
        "instruction": "Choose the correct letter.",
        "question_type": "multiple_choice",
        "questions": [
          {
            "question_id": "q1",
            "question_order": 1,
            "choices": [
              { "id": "a", "label": "A", "content": "True", "is_correct": true },
              { "id": "b", "label": "B", "content": "False", "is_correct": false }
            ]
          }
        ]
      },
      {
        "group_id": "g2",
        "section_order": 2,
        "instruction": "Write ONE WORD ONLY.",
        "question_type": "fill_in_blank",
        "questions": [
          { "question_id": "q2", "question_order": 2, "correct_answer": "river" }
        ]
      }
    ]
  },
  "answers": [
    { "question_id": "q1", "choice_ids": ["a"] },
    { "question_id": "q2", "filled_text_answer": "River" }
  ]
}
"#;
