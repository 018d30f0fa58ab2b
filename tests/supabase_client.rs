// Hosted database client tests against a mock PostgREST server

use jobsoko_match::core::{CandidateMatcher, JobQuery, JobRecommender, JobSource, NEUTRAL_SCORE};
use jobsoko_match::models::{JobPosting, MatchCriteria};
use jobsoko_match::services::{SupabaseClient, SupabaseError, SupabaseTables};
use mockito::Matcher;

fn client(url: String) -> SupabaseClient {
    SupabaseClient::new(
        url,
        "service-key".to_string(),
        SupabaseTables {
            jobs: "jobs".to_string(),
            profiles: "profiles".to_string(),
        },
    )
    .unwrap()
}

fn jobs_body() -> String {
    serde_json::json!([
        {
            "id": "j1",
            "employer_id": "e1",
            "title": "Cashier",
            "category": "Retail",
            "location": "Nakuru",
            "required_skills": ["Cashier", "Sales"],
            "status": "active",
            "deadline": null
        },
        {
            "id": "j2",
            "employer_id": "e2",
            "title": "Shop attendant",
            "category": "retail"
        },
        {
            "id": "j3",
            "title": "Missing employer",
            "category": "Retail"
        },
        {
            "id": "j4",
            "employer_id": "e4",
            "title": "Retail supervisor",
            "category": "Retail management"
        }
    ])
    .to_string()
}

#[tokio::test]
async fn test_fetch_matching_jobs_sends_filters() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/v1/jobs")
        .match_header("apikey", "service-key")
        .match_header("authorization", "Bearer service-key")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("status".into(), "eq.active".into()),
            Matcher::UrlEncoded("category".into(), "ilike.Retail".into()),
            Matcher::UrlEncoded("id".into(), "not.in.(\"j9\")".into()),
            Matcher::UrlEncoded("limit".into(), "1000".into()),
            Matcher::UrlEncoded("offset".into(), "0".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(jobs_body())
        .create_async()
        .await;

    let client = client(server.url());
    let query = JobQuery {
        category: Some("Retail".to_string()),
        exclude_ids: vec!["j9".to_string()],
    };

    let jobs = client.fetch_matching_jobs(&query).await.unwrap();

    mock.assert_async().await;
    // j3 has no employer and fails to parse, j4 is only a partial category match
    let ids: Vec<_> = jobs.iter().map(|j| j.id.as_str()).collect();
    assert_eq!(ids, vec!["j1", "j2"]);
}

#[tokio::test]
async fn test_get_profile_not_found() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/rest/v1/profiles")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.ghost".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;

    let result = client(server.url()).get_profile("ghost").await;

    assert!(matches!(result, Err(SupabaseError::NotFound(_))));
}

#[tokio::test]
async fn test_unauthorized_service_key() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/rest/v1/jobs")
        .match_query(Matcher::Any)
        .with_status(401)
        .create_async()
        .await;

    let result = client(server.url()).fetch_open_jobs(10).await;

    assert!(matches!(result, Err(SupabaseError::Unauthorized)));
}

#[tokio::test]
async fn test_recommendations_fall_back_to_open_jobs() {
    let mut server = mockito::Server::new_async().await;
    let primary = server
        .mock("GET", "/rest/v1/jobs")
        .match_query(Matcher::UrlEncoded("category".into(), "ilike.Fishing".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;
    let fallback = server
        .mock("GET", "/rest/v1/jobs")
        .match_query(Matcher::UrlEncoded("limit".into(), "5".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(jobs_body())
        .create_async()
        .await;

    let client = client(server.url());
    let criteria = MatchCriteria {
        required_skills: vec!["nets".to_string()],
        category: Some("Fishing".to_string()),
        ..Default::default()
    };

    let result = JobRecommender::with_default_weights()
        .recommend_from(&client, &criteria, 5)
        .await
        .unwrap();

    primary.assert_async().await;
    fallback.assert_async().await;
    assert!(result.fallback);
    assert_eq!(result.matches.len(), 3);
    assert!(result.matches.iter().all(|m| m.match_percentage == NEUTRAL_SCORE));
}

fn seeker_row(id: &str, skills: &[&str], location: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "full_name": format!("Seeker {}", id),
        "role": "job_seeker",
        "skills": skills,
        "location": location,
        "is_available": true
    })
}

fn job_row(id: &str, skills: &[&str], location: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "employer_id": "e1",
        "title": format!("Job {}", id),
        "category": "Construction",
        "location": location,
        "required_skills": skills,
        "status": "active"
    })
}

async fn page_mock(
    server: &mut mockito::Server,
    table: &str,
    page_size: usize,
    offset: usize,
    rows: Vec<serde_json::Value>,
) -> mockito::Mock {
    server
        .mock("GET", format!("/rest/v1/{}", table).as_str())
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("limit".into(), page_size.to_string()),
            Matcher::UrlEncoded("offset".into(), offset.to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::Value::Array(rows).to_string())
        .create_async()
        .await
}

#[tokio::test]
async fn test_job_seekers_read_across_pages() {
    let mut server = mockito::Server::new_async().await;
    // Newest first: the only full match is the oldest row, on the last page
    let first = page_mock(
        &mut server,
        "profiles",
        2,
        0,
        vec![seeker_row("s1", &["Cooking"], "Kisumu"), seeker_row("s2", &["Driving"], "Nakuru")],
    )
    .await;
    let second = page_mock(
        &mut server,
        "profiles",
        2,
        2,
        vec![seeker_row("s3", &["Sales"], "Thika"), seeker_row("s4", &["Cleaning"], "Eldoret")],
    )
    .await;
    let last = page_mock(
        &mut server,
        "profiles",
        2,
        4,
        vec![seeker_row("s5", &["Masonry", "Plumbing"], "Ruaka, Kiambu")],
    )
    .await;

    let client = client(server.url()).with_page_size(2);
    let seekers = client.query_job_seekers("e1").await.unwrap();

    first.assert_async().await;
    second.assert_async().await;
    last.assert_async().await;
    assert_eq!(seekers.len(), 5);

    let job: JobPosting = serde_json::from_value(job_row("j1", &["Masonry", "Plumbing"], "Kiambu")).unwrap();
    let result = CandidateMatcher::with_default_weights().find_candidates(&job, seekers, 1);

    assert_eq!(result.total_candidates, 5);
    assert_eq!(result.matches[0].item.id, "s5");
    assert_eq!(result.matches[0].match_percentage, 100);
}

#[tokio::test]
async fn test_recommendations_score_every_page() {
    let mut server = mockito::Server::new_async().await;
    let first = page_mock(
        &mut server,
        "jobs",
        2,
        0,
        vec![job_row("j1", &["Cooking"], "Kisumu"), job_row("j2", &["Driving"], "Nakuru")],
    )
    .await;
    let last = page_mock(&mut server, "jobs", 2, 2, vec![job_row("j3", &["Masonry"], "Kiambu")]).await;

    let client = client(server.url()).with_page_size(2);
    let criteria = MatchCriteria {
        required_skills: vec!["masonry".to_string()],
        location: Some("Kiambu".to_string()),
        category: Some("Construction".to_string()),
        ..Default::default()
    };

    let result = JobRecommender::with_default_weights()
        .recommend_from(&client, &criteria, 1)
        .await
        .unwrap();

    first.assert_async().await;
    last.assert_async().await;
    assert!(!result.fallback);
    assert_eq!(result.total_candidates, 3);
    assert_eq!(result.matches.len(), 1);
    assert_eq!(result.matches[0].item.id, "j3");
}
