use reqwest::Method;
use serde_json::json;

use crate::common::{TestApp, routes};

fn company_data(name: &str, email: &str, employees: i32) -> serde_json::Value {
    json!({
        "name": name,
        "description": "We make things",
        "industry": "Manufacturing",
        "employee_count": employees,
        "email": email,
    })
}

mod creation {
    use super::*;

    #[tokio::test]
    async fn hr_creates_a_company_without_logo() {
        let app = TestApp::spawn().await;
        let (token, user_id, _) = app.create_authenticated_user("company_hr").await;

        let res = app
            .multipart(
                Method::POST,
                routes::COMPANIES,
                &company_data("Acme", "jobs@acme.example", 20),
                None,
                Some(&token),
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["data"]["name"], "Acme");
        assert_eq!(res.body["data"]["hr_user_id"], user_id);
        // No file uploaded: the media reference is absent, not half-empty.
        assert!(res.body["data"]["logo"].is_null());
    }

    #[tokio::test]
    async fn applicants_may_not_create_companies() {
        let app = TestApp::spawn().await;
        let (token, _, _) = app.create_authenticated_user("applicant").await;

        let res = app
            .multipart(
                Method::POST,
                routes::COMPANIES,
                &company_data("Nope Ltd", "jobs@nope.example", 20),
                None,
                Some(&token),
            )
            .await;
        assert_eq!(res.status, 403);
        assert_eq!(res.error_code(), "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn second_company_for_the_same_hr_conflicts() {
        let app = TestApp::spawn().await;
        let (token, _, _) = app.create_authenticated_user("company_hr").await;
        app.create_company(&token, "First Co").await;

        let res = app
            .multipart(
                Method::POST,
                routes::COMPANIES,
                &company_data("Second Co", "jobs@second.example", 30),
                None,
                Some(&token),
            )
            .await;
        assert_eq!(res.status, 409, "{}", res.text);
        assert_eq!(res.error_code(), "CONFLICT");
    }

    #[tokio::test]
    async fn duplicate_name_conflicts_across_hrs() {
        let app = TestApp::spawn().await;
        let (first, _, _) = app.create_authenticated_user("company_hr").await;
        app.create_company(&first, "Uniqueness Co").await;

        let (second, _, _) = app.create_authenticated_user("company_hr").await;
        let res = app
            .multipart(
                Method::POST,
                routes::COMPANIES,
                &company_data("Uniqueness Co", "other@uniq.example", 15),
                None,
                Some(&second),
            )
            .await;
        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn too_few_employees_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let (token, _, _) = app.create_authenticated_user("company_hr").await;

        let res = app
            .multipart(
                Method::POST,
                routes::COMPANIES,
                &company_data("Tiny Co", "jobs@tiny.example", 5),
                None,
                Some(&token),
            )
            .await;
        assert_eq!(res.status, 400);
        assert!(res.body["message"].as_str().unwrap().contains("10 employees"));
    }

    #[tokio::test]
    async fn logo_upload_round_trips_through_the_media_url() {
        let app = TestApp::spawn().await;
        let (token, _, _) = app.create_authenticated_user("company_hr").await;

        let res = app
            .multipart(
                Method::POST,
                routes::COMPANIES,
                &company_data("Logo Co", "jobs@logo.example", 25),
                Some(("logo.png", b"logo png".to_vec(), "image/png")),
                Some(&token),
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);

        let logo = &res.body["data"]["logo"];
        assert!(logo["id"].as_str().is_some_and(|s| !s.is_empty()));
        let url = logo["url"].as_str().unwrap();

        let download = app.client.get(url).send().await.unwrap();
        assert_eq!(download.status(), 200);
        assert_eq!(
            download.headers()["content-type"].to_str().unwrap(),
            "image/png"
        );
        assert_eq!(download.bytes().await.unwrap().as_ref(), b"logo png");
    }
}

mod reads {
    use super::*;

    #[tokio::test]
    async fn owner_reads_company_with_jobs() {
        let app = TestApp::spawn().await;
        let (token, _, _) = app.create_authenticated_user("company_hr").await;
        let company_id = app.create_company(&token, "Jobs Inc").await;
        app.create_job(&token, "Backend Engineer").await;
        app.create_job(&token, "Frontend Engineer").await;

        let res = app.get_with_token(&routes::company(company_id), &token).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"]["company"]["name"], "Jobs Inc");
        assert_eq!(res.body["data"]["jobs"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn non_owner_sees_404() {
        let app = TestApp::spawn().await;
        let (owner, _, _) = app.create_authenticated_user("company_hr").await;
        let company_id = app.create_company(&owner, "Private Co").await;

        let (other, _, _) = app.create_authenticated_user("company_hr").await;
        let res = app.get_with_token(&routes::company(company_id), &other).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn search_finds_companies_by_name_for_any_role() {
        let app = TestApp::spawn().await;
        let (hr, _, _) = app.create_authenticated_user("company_hr").await;
        app.create_company(&hr, "Findable Co").await;

        let (applicant, _, _) = app.create_authenticated_user("applicant").await;
        let res = app
            .get_with_token(
                &format!("{}?name=Findable%20Co", routes::COMPANY_SEARCH),
                &applicant,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"]["name"], "Findable Co");

        let missing = app
            .get_with_token(
                &format!("{}?name=Ghost%20Co", routes::COMPANY_SEARCH),
                &applicant,
            )
            .await;
        assert_eq!(missing.status, 404);
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn owner_patches_fields() {
        let app = TestApp::spawn().await;
        let (token, _, _) = app.create_authenticated_user("company_hr").await;
        let company_id = app.create_company(&token, "Patchable Co").await;

        let res = app
            .multipart(
                Method::PATCH,
                &routes::company(company_id),
                &json!({ "name": "Patched Co", "employee_count": 42 }),
                None,
                Some(&token),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"]["name"], "Patched Co");
        assert_eq!(res.body["data"]["employee_count"], 42);
    }

    #[tokio::test]
    async fn shrinking_below_the_minimum_headcount_is_rejected() {
        let app = TestApp::spawn().await;
        let (token, _, _) = app.create_authenticated_user("company_hr").await;
        let company_id = app.create_company(&token, "Shrink Co").await;

        let res = app
            .multipart(
                Method::PATCH,
                &routes::company(company_id),
                &json!({ "employee_count": 3 }),
                None,
                Some(&token),
            )
            .await;
        assert_eq!(res.status, 400);
    }
}

mod deletion {
    use super::*;
    use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
    use server::entity::{application, job};

    /// The full lifecycle: create, conflict on a second company, post a job,
    /// take an application, then cascade everything away.
    #[tokio::test]
    async fn deleting_a_company_cascades_jobs_and_applications() {
        let app = TestApp::spawn().await;

        let (hr, hr_id, _) = app.create_authenticated_user("company_hr").await;
        let company_id = app.create_company(&hr, "Acme Corp").await;

        let second = app
            .multipart(
                Method::POST,
                routes::COMPANIES,
                &company_data("Beta Corp", "jobs@beta.example", 20),
                None,
                Some(&hr),
            )
            .await;
        assert_eq!(second.status, 409);

        let job_id = app.create_job(&hr, "Backend Engineer").await;
        let other_job_id = app.create_job(&hr, "Data Engineer").await;

        let (applicant, _, _) = app.create_authenticated_user("applicant").await;
        let application_id = app.apply_to_job(&applicant, job_id, &["Go"]).await;
        app.apply_to_job(&applicant, other_job_id, &["SQL"]).await;

        let res = app.delete_with_token(&routes::company(company_id), &hr).await;
        assert_eq!(res.status, 200, "{}", res.text);

        // Zero remaining jobs with that owner, zero applications to them.
        let jobs_left = job::Entity::find()
            .filter(job::Column::AddedBy.eq(hr_id))
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(jobs_left, 0);
        let applications_left = application::Entity::find()
            .filter(application::Column::JobId.is_in([job_id, other_job_id]))
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(applications_left, 0);

        // Second lookups by id are 404s.
        let company_gone = app.get_with_token(&routes::company(company_id), &hr).await;
        assert_eq!(company_gone.status, 404);
        let job_gone = app
            .patch_with_token(&routes::job(job_id), &json!({}), &hr)
            .await;
        assert_eq!(job_gone.status, 404);
        assert!(
            application::Entity::find_by_id(application_id)
                .one(&app.db)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn deleting_a_company_with_no_jobs_is_fine() {
        let app = TestApp::spawn().await;
        let (hr, _, _) = app.create_authenticated_user("company_hr").await;
        let company_id = app.create_company(&hr, "Quiet Co").await;

        let res = app.delete_with_token(&routes::company(company_id), &hr).await;
        assert_eq!(res.status, 200, "{}", res.text);
    }

    #[tokio::test]
    async fn deleting_a_company_removes_its_media_folder() {
        let app = TestApp::spawn().await;
        let (hr, _, _) = app.create_authenticated_user("company_hr").await;

        let created = app
            .multipart(
                Method::POST,
                routes::COMPANIES,
                &company_data("Media Co", "jobs@media.example", 12),
                Some(("logo.png", b"media co logo".to_vec(), "image/png")),
                Some(&hr),
            )
            .await;
        assert_eq!(created.status, 201, "{}", created.text);
        let company_id = created.body["data"]["id"].as_i64().unwrap() as i32;
        let logo_url = created.body["data"]["logo"]["url"].as_str().unwrap().to_string();

        let res = app.delete_with_token(&routes::company(company_id), &hr).await;
        assert_eq!(res.status, 200, "{}", res.text);

        let download = app.client.get(&logo_url).send().await.unwrap();
        assert_eq!(download.status(), 404);
    }
}
