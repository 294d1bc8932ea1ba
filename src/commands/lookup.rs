use anyhow::{Context, Result};

use super::session::{print_json, Session};

pub async fn person(session: &Session, id: &str, languages: &[String]) -> Result<()> {
    let info = session
        .service
        .persons()
        .get_info(id, languages)
        .await
        .with_context(|| format!("Person lookup failed for {id}"))?;

    match &info {
        Some(person) => tracing::info!(
            id = person.short_id().unwrap_or(id),
            abstracts = ?person.abstract_languages(),
            "Person found"
        ),
        None => tracing::info!(id = %id, "No person data"),
    }
    print_json(&info)
}

pub async fn place(
    session: &Session,
    id: &str,
    language: Option<&str>,
    position_only: bool,
) -> Result<()> {
    let places = session.service.places();

    if position_only {
        let point = places
            .get_position(id)
            .await
            .with_context(|| format!("Position lookup failed for {id}"))?;
        return print_json(&point);
    }

    let info = places
        .get_info(id, language)
        .await
        .with_context(|| format!("Place lookup failed for {id}"))?;

    if info.is_none() {
        tracing::info!(id = %id, "No place data");
    }
    print_json(&info)
}

pub async fn point(session: &Session, id: &str) -> Result<()> {
    let point = session
        .service
        .geo()
        .get_point(id)
        .await
        .with_context(|| format!("Point lookup failed for {id}"))?;

    if point.is_none() {
        tracing::info!(id = %id, "No coordinates");
    }
    print_json(&point)
}
