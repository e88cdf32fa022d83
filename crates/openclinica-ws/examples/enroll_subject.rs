//! Enroll a study subject unless it already exists, then schedule its
//! first event.
//!
//! ```bash
//! cargo run --example enroll_subject -- default-study SS-0001 SE_BASELINE
//! ```

use openclinica_ws::{NewEvent, NewSubject, OcwsConfig, Webservices};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [study_id, label, event_oid] = args.as_slice() else {
        eprintln!("usage: enroll_subject <study-id> <subject-label> <event-definition-oid>");
        std::process::exit(2);
    };

    let ws = Webservices::new(OcwsConfig::discover(None)?);

    if let Some(oid) = ws.subject_exists(study_id, label, None).await? {
        println!("{label} already enrolled as {oid}");
    } else {
        let created = ws
            .create_subject(&NewSubject {
                study_id,
                subject_label: label,
                enrollment_date: "2015-01-01",
                gender: "f",
                date_of_birth: Some("1980"),
                ..NewSubject::default()
            })
            .await?;
        println!("create: {} {:?}", created.status.result, created.status.errors);
    }

    let scheduled = ws
        .schedule_event(&NewEvent {
            study_id,
            subject_label: label,
            event_definition_oid: event_oid,
            location: "Clinic",
            start_date: "2015-01-02",
            ..NewEvent::default()
        })
        .await?;
    println!(
        "schedule: {} ordinal {:?} {:?}",
        scheduled.status.result, scheduled.study_event_ordinal, scheduled.status.errors
    );

    Ok(())
}
