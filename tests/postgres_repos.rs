use sqlx::PgPool;

use pageinsight::application::acquisition::{
    EMPLOYEE_COUNT, FOLLOWER_COUNT, FOLLOWING_COUNT, SyntheticSource,
};
use pageinsight::application::pagination::OffsetWindow;
use pageinsight::application::repos::{
    CommentsRepo, EmployeesRepo, FollowersRepo, PageSearchFilter, PagesRepo, PostsRepo, RepoError,
};
use pageinsight::domain::entities::{AcquiredPage, NewEmployee, NewPage};
use pageinsight::domain::types::Relation;
use pageinsight::infra::db::PostgresRepositories;

fn first_page(limit: i64) -> OffsetWindow {
    OffsetWindow::new(1, limit)
}

async fn store(repos: &PostgresRepositories, acquired: &AcquiredPage) {
    repos.create_page(&acquired.page).await.expect("create page");
    repos.insert_posts(&acquired.posts).await.expect("insert posts");
    repos
        .insert_employees(&acquired.employees)
        .await
        .expect("insert employees");
    repos
        .insert_comments(&acquired.comments)
        .await
        .expect("insert comments");
    repos
        .insert_relations(&acquired.followers)
        .await
        .expect("insert followers");
    repos
        .insert_relations(&acquired.following)
        .await
        .expect("insert following");
}

fn named_page(page_id: &str, name: &str, industry: &str, followers: i64) -> NewPage {
    let mut page = SyntheticSource::new(0).generate(page_id).page;
    page.name = name.to_string();
    page.industry = Some(industry.to_string());
    page.followers = followers;
    page
}

#[sqlx::test(migrations = "./migrations")]
async fn create_page_returns_stored_columns(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    let page = SyntheticSource::new(0).generate("acme").page;

    let record = repos.create_page(&page).await.expect("create page");

    assert_eq!(record.page_id, "acme");
    assert_eq!(record.name, page.name);
    assert_eq!(record.specialties, page.specialties);
    assert_eq!(record.linkedin_internal_id, page.linkedin_internal_id);
    assert_eq!(record.created_at, record.last_scraped_at);

    let found = repos
        .find_by_page_id("acme")
        .await
        .expect("find page")
        .expect("page stored");
    assert_eq!(found, record);
    assert!(repos.find_by_page_id("ghost").await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn second_page_insert_is_a_duplicate(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    let page = SyntheticSource::new(0).generate("acme").page;
    repos.create_page(&page).await.expect("first insert");

    let err = repos.create_page(&page).await.unwrap_err();

    match err {
        RepoError::Duplicate { constraint } => assert_eq!(constraint, "pages_page_id_key"),
        other => panic!("expected duplicate, got {other:?}"),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn fan_out_inserts_report_row_counts(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    let acquired = SyntheticSource::new(6).generate("acme");
    repos.create_page(&acquired.page).await.expect("create page");

    assert_eq!(repos.insert_posts(&acquired.posts).await.unwrap(), 6);
    assert_eq!(
        repos.insert_employees(&acquired.employees).await.unwrap(),
        EMPLOYEE_COUNT as u64
    );
    assert_eq!(
        repos.insert_comments(&acquired.comments).await.unwrap(),
        acquired.comments.len() as u64
    );
    assert_eq!(
        repos.insert_relations(&acquired.followers).await.unwrap(),
        FOLLOWER_COUNT as u64
    );
    assert_eq!(
        repos.insert_relations(&acquired.following).await.unwrap(),
        FOLLOWING_COUNT as u64
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn large_batches_are_split_and_keep_insertion_order(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    let employees: Vec<NewEmployee> = (0..1_200)
        .map(|i| NewEmployee {
            page_id: "acme".to_string(),
            name: format!("Employee {i}"),
            role: "Engineer".to_string(),
            profile_url: "https://www.linkedin.com/company/acme/people/".to_string(),
        })
        .collect();

    assert_eq!(repos.insert_employees(&employees).await.unwrap(), 1_200);

    let tail = repos
        .list_employees("acme", OffsetWindow::new(24, 50))
        .await
        .unwrap();
    assert_eq!(tail.len(), 50);
    assert_eq!(tail[0].name, "Employee 1150");
    assert_eq!(tail[49].name, "Employee 1199");
}

#[sqlx::test(migrations = "./migrations")]
async fn posts_and_comments_list_newest_first(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    let acquired = SyntheticSource::new(20).generate("acme");
    store(&repos, &acquired).await;

    let posts = repos
        .list_recent_posts("acme", OffsetWindow::new(2, 5))
        .await
        .unwrap();
    let ids: Vec<_> = posts.iter().map(|post| post.post_id.as_str()).collect();
    assert_eq!(
        ids,
        ["acme_post_5", "acme_post_6", "acme_post_7", "acme_post_8", "acme_post_9"]
    );

    let comments = repos
        .list_comments("acme", None, first_page(50))
        .await
        .unwrap();
    assert!(
        comments
            .windows(2)
            .all(|pair| pair[0].posted_at >= pair[1].posted_at)
    );

    let narrowed = repos
        .list_comments("acme", Some("acme_post_3"), first_page(50))
        .await
        .unwrap();
    let expected = acquired
        .comments
        .iter()
        .filter(|comment| comment.post_id == "acme_post_3")
        .count();
    assert_eq!(narrowed.len(), expected);
    assert!(narrowed.iter().all(|row| row.post_id == "acme_post_3"));
}

#[sqlx::test(migrations = "./migrations")]
async fn relations_round_trip_through_enum(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    let acquired = SyntheticSource::new(1).generate("acme");
    store(&repos, &acquired).await;

    let followers = repos
        .list_relations("acme", Relation::Follower, first_page(50))
        .await
        .unwrap();
    let following = repos
        .list_relations("acme", Relation::Following, first_page(50))
        .await
        .unwrap();

    assert_eq!(followers.len(), FOLLOWER_COUNT);
    assert_eq!(following.len(), FOLLOWING_COUNT);
    assert!(followers.iter().all(|row| row.relation == Relation::Follower));
    assert!(following.iter().all(|row| row.relation == Relation::Following));
    assert_eq!(followers[0].profile_id, "follower_0");
}

#[sqlx::test(migrations = "./migrations")]
async fn search_applies_text_filters_and_follower_bounds(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    for page in [
        named_page("pure", "100% Pure", "Food Production", 30_000),
        named_page("labs", "1000 Labs", "Research", 60_000),
        named_page("under", "Under_Score", "Software Development", 90_000),
        named_page("undr", "UnderXScore", "Software Development", 10_000),
    ] {
        repos.create_page(&page).await.expect("create page");
    }

    let search = |industry: Option<&str>, name: Option<&str>, min: Option<i64>, max: Option<i64>| {
        PageSearchFilter::new(
            industry.map(str::to_string),
            name.map(str::to_string),
            min,
            max,
        )
    };
    let ids = |rows: Vec<pageinsight::domain::entities::PageRecord>| {
        let mut ids: Vec<String> = rows.into_iter().map(|row| row.page_id).collect();
        ids.sort();
        ids
    };

    let rows = repos
        .search_pages(&search(None, Some("100%"), None, None), first_page(10))
        .await
        .unwrap();
    assert_eq!(ids(rows), ["pure"]);

    let rows = repos
        .search_pages(&search(None, Some("under_"), None, None), first_page(10))
        .await
        .unwrap();
    assert_eq!(ids(rows), ["under"]);

    let rows = repos
        .search_pages(&search(Some("SOFTWARE"), None, None, None), first_page(10))
        .await
        .unwrap();
    assert_eq!(ids(rows), ["under", "undr"]);

    let rows = repos
        .search_pages(
            &search(None, None, Some(30_000), Some(60_000)),
            first_page(10),
        )
        .await
        .unwrap();
    assert_eq!(ids(rows), ["labs", "pure"]);

    let rows = repos
        .search_pages(&search(None, None, None, None), OffsetWindow::new(2, 3))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}
