use serde_json::json;

use crate::common::{TestApp, routes};

mod creation {
    use super::*;

    #[tokio::test]
    async fn hr_with_a_company_posts_a_job() {
        let app = TestApp::spawn().await;
        let (token, user_id, _) = app.create_authenticated_user("company_hr").await;
        app.create_company(&token, "Poster Co").await;

        let res = app
            .post_with_token(
                routes::JOBS,
                &json!({
                    "title": "Backend Engineer",
                    "location": "remote",
                    "working_time": "full-time",
                    "seniority": "mid",
                    "description": "Own the API.",
                    "technical_skills": ["Rust"],
                }),
                &token,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["data"]["added_by"], user_id);
        assert_eq!(res.body["data"]["location"], "remote");
        assert_eq!(res.body["data"]["technical_skills"][0], "Rust");
    }

    #[tokio::test]
    async fn posting_without_a_company_is_rejected() {
        let app = TestApp::spawn().await;
        let (token, _, _) = app.create_authenticated_user("company_hr").await;

        let res = app
            .post_with_token(
                routes::JOBS,
                &json!({
                    "title": "Orphan Job",
                    "location": "remote",
                    "working_time": "full-time",
                    "seniority": "mid",
                    "description": "No company yet.",
                }),
                &token,
            )
            .await;
        assert_eq!(res.status, 400, "{}", res.text);
        assert!(res.body["message"].as_str().unwrap().contains("company"));
    }

    #[tokio::test]
    async fn applicants_may_not_post_jobs() {
        let app = TestApp::spawn().await;
        let (token, _, _) = app.create_authenticated_user("applicant").await;

        let res = app
            .post_with_token(
                routes::JOBS,
                &json!({
                    "title": "Sneaky Job",
                    "location": "remote",
                    "working_time": "full-time",
                    "seniority": "mid",
                    "description": "Nope.",
                }),
                &token,
            )
            .await;
        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn unknown_enum_literals_are_rejected() {
        let app = TestApp::spawn().await;
        let (token, _, _) = app.create_authenticated_user("company_hr").await;
        app.create_company(&token, "Enum Co").await;

        for (field, value) in [
            ("location", "moon"),
            ("working_time", "sometimes"),
            ("seniority", "wizard"),
        ] {
            let mut body = json!({
                "title": "Enum Job",
                "location": "onsite",
                "working_time": "part-time",
                "seniority": "junior",
                "description": "Enums only.",
            });
            body[field] = json!(value);

            let res = app.post_with_token(routes::JOBS, &body, &token).await;
            assert_eq!(res.status, 400, "{field}={value} got {}", res.text);
            assert_eq!(res.error_code(), "VALIDATION_ERROR");
        }
    }
}

mod update_and_delete {
    use super::*;
    use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
    use server::entity::application;

    #[tokio::test]
    async fn owner_updates_with_patch_semantics() {
        let app = TestApp::spawn().await;
        let (token, _, _) = app.create_authenticated_user("company_hr").await;
        app.create_company(&token, "Update Co").await;
        let job_id = app.create_job(&token, "Backend Engineer").await;

        let res = app
            .patch_with_token(
                &routes::job(job_id),
                &json!({ "seniority": "senior" }),
                &token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"]["seniority"], "senior");
        // Unspecified fields are untouched.
        assert_eq!(res.body["data"]["title"], "Backend Engineer");

        let noop = app
            .patch_with_token(&routes::job(job_id), &json!({}), &token)
            .await;
        assert_eq!(noop.status, 200);
        assert_eq!(noop.body["data"]["seniority"], "senior");
    }

    #[tokio::test]
    async fn non_owner_cannot_touch_the_job() {
        let app = TestApp::spawn().await;
        let (owner, _, _) = app.create_authenticated_user("company_hr").await;
        app.create_company(&owner, "Mine Co").await;
        let job_id = app.create_job(&owner, "Backend Engineer").await;

        let (other, _, _) = app.create_authenticated_user("company_hr").await;
        app.create_company(&other, "Theirs Co").await;

        let update = app
            .patch_with_token(&routes::job(job_id), &json!({ "title": "Stolen" }), &other)
            .await;
        assert_eq!(update.status, 404);

        let delete = app.delete_with_token(&routes::job(job_id), &other).await;
        assert_eq!(delete.status, 404);
    }

    #[tokio::test]
    async fn deleting_a_job_cascades_its_applications() {
        let app = TestApp::spawn().await;
        let (hr, _, _) = app.create_authenticated_user("company_hr").await;
        app.create_company(&hr, "Cascade Jobs Co").await;
        let job_id = app.create_job(&hr, "Doomed Job").await;

        let (applicant, _, _) = app.create_authenticated_user("applicant").await;
        app.apply_to_job(&applicant, job_id, &["Rust"]).await;

        let res = app.delete_with_token(&routes::job(job_id), &hr).await;
        assert_eq!(res.status, 200, "{}", res.text);

        let remaining = application::Entity::find()
            .filter(application::Column::JobId.eq(job_id))
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }
}

mod listing {
    use super::*;

    async fn seed_jobs(app: &TestApp) -> String {
        let (hr, _, _) = app.create_authenticated_user("company_hr").await;
        app.create_company(&hr, "Seed Co").await;

        for (title, location) in [
            ("Backend Engineer", "remote"),
            ("Platform Engineer", "remote"),
            ("Office Manager", "onsite"),
        ] {
            let res = app
                .post_with_token(
                    routes::JOBS,
                    &json!({
                        "title": title,
                        "location": location,
                        "working_time": "full-time",
                        "seniority": "mid",
                        "description": "Seeded.",
                    }),
                    &hr,
                )
                .await;
            assert_eq!(res.status, 201, "{}", res.text);
        }
        hr
    }

    #[tokio::test]
    async fn listing_paginates_and_resolves_companies() {
        let app = TestApp::spawn().await;
        let hr = seed_jobs(&app).await;

        let page1 = app
            .get_with_token(&format!("{}?page=1&per_page=2", routes::JOBS), &hr)
            .await;
        assert_eq!(page1.status, 200, "{}", page1.text);
        assert_eq!(page1.body["data"]["data"].as_array().unwrap().len(), 2);
        assert_eq!(page1.body["data"]["pagination"]["total"], 3);
        assert_eq!(page1.body["data"]["pagination"]["total_pages"], 2);
        // Every job row carries its resolved company.
        assert_eq!(
            page1.body["data"]["data"][0]["company"]["name"],
            "Seed Co"
        );

        let page2 = app
            .get_with_token(&format!("{}?page=2&per_page=2", routes::JOBS), &hr)
            .await;
        assert_eq!(page2.body["data"]["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn allow_listed_filters_narrow_the_results() {
        let app = TestApp::spawn().await;
        let hr = seed_jobs(&app).await;

        let remote = app
            .get_with_token(&format!("{}?location=remote", routes::JOBS), &hr)
            .await;
        assert_eq!(remote.body["data"]["pagination"]["total"], 2);

        let titled = app
            .get_with_token(&format!("{}?title=engineer", routes::JOBS), &hr)
            .await;
        assert_eq!(titled.body["data"]["pagination"]["total"], 2);

        let combined = app
            .get_with_token(
                &format!("{}?location=onsite&title=manager", routes::JOBS),
                &hr,
            )
            .await;
        assert_eq!(combined.body["data"]["pagination"]["total"], 1);
    }

    #[tokio::test]
    async fn unknown_filter_keys_are_ignored() {
        let app = TestApp::spawn().await;
        let hr = seed_jobs(&app).await;

        // `status` is not in the allow-list; it must not reach the store.
        let res = app
            .get_with_token(&format!("{}?status=evil&foo=bar", routes::JOBS), &hr)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"]["pagination"]["total"], 3);
    }

    #[tokio::test]
    async fn invalid_filter_values_are_rejected_not_passed_through() {
        let app = TestApp::spawn().await;
        let hr = seed_jobs(&app).await;

        let res = app
            .get_with_token(&format!("{}?location=moon", routes::JOBS), &hr)
            .await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn company_jobs_endpoint_groups_by_company() {
        let app = TestApp::spawn().await;
        let hr = seed_jobs(&app).await;

        let res = app
            .get_with_token(
                &format!("{}?name=Seed%20Co", routes::JOBS_BY_COMPANY),
                &hr,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"]["company"]["name"], "Seed Co");
        assert_eq!(res.body["data"]["jobs"].as_array().unwrap().len(), 3);

        let missing = app
            .get_with_token(
                &format!("{}?name=Nowhere%20Co", routes::JOBS_BY_COMPANY),
                &hr,
            )
            .await;
        assert_eq!(missing.status, 404);
    }
}
