// Criterion benchmarks for JobSoko Match

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use jobsoko_match::core::{calculate_match_score, CandidateMatcher, JobRecommender};
use jobsoko_match::models::{CandidateProfile, JobPosting, MatchCriteria, ScoringWeights, UserRole};

const SKILLS: &[&str] = &["Cooking", "Cleaning", "Driving", "Masonry", "Plumbing", "Sales", "Tailoring"];
const TOWNS: &[&str] = &["Westlands, Nairobi", "Nyali, Mombasa", "Kisumu", "Nakuru", "Eldoret", "Thika"];
const CATEGORIES: &[&str] = &["Domestic", "Transport", "Construction", "Retail", "Hospitality"];

fn create_job(id: usize) -> JobPosting {
    JobPosting {
        id: format!("job-{}", id),
        employer_id: "employer".to_string(),
        title: format!("{} needed", SKILLS[id % SKILLS.len()]),
        description: Some("Casual work, paid weekly via M-Pesa".to_string()),
        category: Some(CATEGORIES[id % CATEGORIES.len()].to_string()),
        location: Some(TOWNS[id % TOWNS.len()].to_string()),
        required_skills: vec![
            SKILLS[id % SKILLS.len()].to_string(),
            SKILLS[(id + 3) % SKILLS.len()].to_string(),
        ],
        experience_level: Some("1 year".to_string()),
        salary_min: None,
        salary_max: None,
        job_type: None,
        status: Default::default(),
        deadline: None,
        created_at: None,
    }
}

fn create_candidate(id: usize) -> CandidateProfile {
    CandidateProfile {
        id: format!("user-{}", id),
        full_name: format!("User {}", id),
        role: UserRole::JobSeeker,
        skills: vec![
            SKILLS[id % SKILLS.len()].to_string(),
            SKILLS[(id + 1) % SKILLS.len()].to_string(),
        ],
        location: Some(TOWNS[(id + 2) % TOWNS.len()].to_string()),
        preferred_category: Some(CATEGORIES[id % CATEGORIES.len()].to_string()),
        experience: Some(format!("{} years", id % 5)),
        bio: None,
        is_available: true,
        created_at: None,
    }
}

fn seeker_criteria() -> MatchCriteria {
    MatchCriteria {
        required_skills: vec!["cooking".to_string(), "cleaning".to_string()],
        location: Some("Nairobi".to_string()),
        category: Some("Domestic".to_string()),
        experience_level: None,
        search_history: vec!["house".to_string(), "weekly".to_string()],
        application_history: vec!["job-1".to_string()],
    }
}

fn bench_single_score(c: &mut Criterion) {
    let job = create_job(7);
    let criteria = seeker_criteria();

    c.bench_function("calculate_match_score", |b| {
        b.iter(|| {
            calculate_match_score(
                black_box(&job),
                black_box(&criteria),
                black_box(&ScoringWeights::RECOMMENDATION),
            )
        });
    });
}

fn bench_recommendations(c: &mut Criterion) {
    let recommender = JobRecommender::with_default_weights();
    let criteria = seeker_criteria();

    let mut group = c.benchmark_group("recommendations");

    for job_count in [10, 50, 100, 500, 1000].iter() {
        let jobs: Vec<JobPosting> = (0..*job_count).map(create_job).collect();

        group.bench_with_input(BenchmarkId::new("recommend", job_count), job_count, |b, _| {
            b.iter(|| recommender.recommend(black_box(&criteria), black_box(jobs.clone()), black_box(20)));
        });
    }

    group.finish();
}

fn bench_candidate_matching(c: &mut Criterion) {
    let matcher = CandidateMatcher::with_default_weights();
    let job = create_job(3);
    let candidates: Vec<CandidateProfile> = (0..500).map(create_candidate).collect();

    c.bench_function("find_candidates_500", |b| {
        b.iter(|| matcher.find_candidates(black_box(&job), black_box(candidates.clone()), black_box(20)));
    });
}

criterion_group!(benches, bench_single_score, bench_recommendations, bench_candidate_matching);

criterion_main!(benches);
