//! Ask command - runs tutoring operations through the server.

use std::{io::Write, sync::Arc};

use base64ct::{Base64, Encoding};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use scholarai::{
    SystemClock,
    api::{ApiRequest, Output},
    client::ScholarClient,
    local_store::LocalStore,
    session::{ChatSession, QuizSession, Selection},
    types::{QuizQuestion, StudyPlanDetails, UserProfile},
};

use crate::{
    cli::{AskArgs, AskCommand},
    output::{OutputFormat, option_label, print_output, print_question, print_table},
};

type Input = Lines<BufReader<Stdin>>;

/// Run the ask command
pub async fn run(args: &AskArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = LocalStore::in_dir(args.data.dir());
    let mut client = ScholarClient::new(&args.endpoint, store.clone())?;
    if let Some(url) = &args.provider_url {
        client = client.with_direct_base_url(url);
    }
    let profile = store.load().await?.profile;
    let format = OutputFormat::from_json_flag(args.json);

    // Operation failures carry user-facing guidance; print them plainly.
    if let Err(e) = dispatch(&client, &args.operation, profile.as_ref(), format).await {
        eprintln!("{e}");
        std::process::exit(1);
    }
    Ok(())
}

async fn dispatch(
    client: &ScholarClient,
    operation: &AskCommand,
    profile: Option<&UserProfile>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = match operation {
        AskCommand::Chat { message: None } => return chat_loop(client, profile).await,
        AskCommand::Chat {
            message: Some(message),
        } => ApiRequest::Chat {
            history: Vec::new(),
            new_message: message.clone(),
            user_context: profile.map(UserProfile::user_context).unwrap_or_default(),
        },
        AskCommand::Notes { topic } => ApiRequest::Notes {
            topic: topic.clone(),
        },
        AskCommand::Doubt { doubt, image } => {
            let image = match image {
                Some(path) => Some(Base64::encode_string(&tokio::fs::read(path).await?)),
                None => None,
            };
            ApiRequest::Doubt {
                doubt: doubt.clone(),
                image,
            }
        }
        AskCommand::Quiz {
            topic,
            difficulty,
            print,
        } => {
            let questions = client.generate_quiz(topic, difficulty).await?;
            if *print || format == OutputFormat::Json {
                print_output(&Output::Quiz(questions), format)?;
                return Ok(());
            }
            return take_quiz(questions).await;
        }
        AskCommand::Career { query } => ApiRequest::Career {
            profile: profile
                .map(UserProfile::career_profile)
                .unwrap_or_else(|| "Not provided".to_string()),
            query: query.clone(),
        },
        AskCommand::Plan {
            subjects,
            hours,
            exam_date,
            weak_areas,
        } => ApiRequest::Plan {
            details: StudyPlanDetails {
                subjects: subjects.clone(),
                hours_per_day: hours.clone(),
                exam_date: exam_date.clone(),
                weak_areas: weak_areas.clone(),
            },
        },
    };

    let output = client.call(&request).await?;
    print_output(&output, format)?;
    Ok(())
}

fn stdin_lines() -> Input {
    BufReader::new(tokio::io::stdin()).lines()
}

async fn prompt(lines: &mut Input, label: &str) -> std::io::Result<Option<String>> {
    print!("{label}");
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?.map(|line| line.trim().to_string()))
}

/// Interactive conversation with the coach.
async fn chat_loop(
    client: &ScholarClient,
    profile: Option<&UserProfile>,
) -> Result<(), Box<dyn std::error::Error>> {
    let name = profile.map_or("Student", |p| p.name.as_str());
    let context = profile.map(UserProfile::user_context).unwrap_or_default();
    let mut session = ChatSession::new(name, Arc::new(SystemClock));
    println!("{}", session.history()[0].text);
    println!("(/reset starts over, /quit leaves)");

    let mut lines = stdin_lines();
    while let Some(input) = prompt(&mut lines, "\n> ").await? {
        match input.as_str() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/reset" => {
                session.reset();
                println!("{}", session.history()[0].text);
                continue;
            }
            _ => {}
        }

        session.push_user(input.as_str());
        match client
            .chat_with_coach(session.prior_history(), &input, &context)
            .await
        {
            Ok(reply) => {
                println!("\n{reply}");
                session.push_model(reply);
            }
            Err(e) => {
                eprintln!("{e}");
                session.push_failure(e);
            }
        }
    }
    Ok(())
}

/// Parse "A".."Z" or a 1-based number into an option index.
fn parse_choice(input: &str) -> Option<usize> {
    let input = input.trim();
    if let Ok(number) = input.parse::<usize>() {
        return number.checked_sub(1);
    }
    let mut chars = input.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            Some((c.to_ascii_uppercase() as u8 - b'A') as usize)
        }
        _ => None,
    }
}

/// Run a quiz question by question and print the score.
async fn take_quiz(questions: Vec<QuizQuestion>) -> Result<(), Box<dyn std::error::Error>> {
    let mut quiz = QuizSession::new(questions);
    if quiz.is_empty() {
        println!("No questions could be generated. Try another topic.");
        return Ok(());
    }

    let mut lines = stdin_lines();
    let mut rows = Vec::new();
    while let Some(question) = quiz.current().cloned() {
        println!();
        print_question(quiz.current_index() + 1, quiz.len(), &question);

        let selection = loop {
            let Some(input) = prompt(&mut lines, "Your answer: ").await? else {
                return Ok(());
            };
            let Some(choice) = parse_choice(&input) else {
                eprintln!("Answer with a letter or a number.");
                continue;
            };
            match quiz.select(choice) {
                Ok(selection) => break selection,
                Err(e) => eprintln!("{e}"),
            }
        };

        match selection {
            Selection::Correct => println!("Correct! {}", question.explanation),
            Selection::Incorrect { correct_answer } => println!(
                "Incorrect. The answer is {}. {}",
                option_label(correct_answer),
                question.explanation
            ),
            Selection::AlreadyAnswered => {}
        }
        rows.push(vec![
            (quiz.current_index() + 1).to_string(),
            quiz.selected().map(option_label).map(String::from).unwrap_or_default(),
            option_label(question.correct_answer).to_string(),
        ]);
        quiz.next();
    }

    println!();
    println!("Score: {}/{}", quiz.score(), quiz.len());
    print_table(&["#", "Yours", "Correct"], &rows);
    Ok(())
}
