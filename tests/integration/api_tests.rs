//! End-to-end tests against a running server
//!
//! Start the server with a fresh database and an `[admin]` account
//! `admin` / `admin`, then run: cargo test -- --ignored

use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:8080";

fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to build client")
}

/// Unique suffix so repeated runs do not collide on unique columns
fn suffix() -> String {
    format!("{}", Utc::now().timestamp_micros() % 10_000_000_000)
}

async fn login(client: &Client, username: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/login/", BASE_URL))
        .form(&[("username", username), ("password", password)])
        .send()
        .await
        .expect("Failed to send login request");

    assert!(response.status().is_success());
    response.text().await.expect("Failed to read page")
}

async fn register_student(client: &Client, tag: &str) -> String {
    let username = format!("student{}", tag);
    let registration_no = format!("R{}", tag);
    let response = client
        .post(format!("{}/register/", BASE_URL))
        .form(&[
            ("username", username.as_str()),
            ("email", "student@example.org"),
            ("password", "secret"),
            ("confirm_password", "secret"),
            ("name", "Test Student"),
            ("registration_no", registration_no.as_str()),
            ("roll", "1"),
            ("department", "CSE"),
            ("season", "2023-24"),
            ("semester", "1st"),
            ("shift", "Day"),
        ])
        .send()
        .await
        .expect("Failed to send registration");

    let page = response.text().await.expect("Failed to read page");
    assert!(page.contains("Registration successful!"), "{}", page);
    registration_no
}

async fn add_book(admin: &Client, title: &str, isbn: &str, quantity: u32) -> String {
    let quantity = quantity.to_string();
    let response = admin
        .post(format!("{}/books/add/", BASE_URL))
        .form(&[
            ("title", title),
            ("author_name", "A. Tester"),
            ("isbn", isbn),
            ("book_type", "Reference"),
            ("quantity", quantity.as_str()),
        ])
        .send()
        .await
        .expect("Failed to add book");
    response.text().await.expect("Failed to read page")
}

async fn get_page(client: &Client, path: &str) -> String {
    client
        .get(format!("{}{}", BASE_URL, path))
        .send()
        .await
        .expect("Failed to load page")
        .text()
        .await
        .expect("Failed to read page")
}

async fn post_page(client: &Client, path: &str, form: &[(&str, &str)]) -> String {
    client
        .post(format!("{}{}", BASE_URL, path))
        .form(form)
        .send()
        .await
        .expect("Failed to post form")
        .text()
        .await
        .expect("Failed to read page")
}

/// Number that follows the first `marker` after `anchor` in a page
fn id_after(page: &str, anchor: &str, marker: &str) -> i64 {
    let from = page.find(anchor).expect("anchor not on page");
    let rest = &page[from..];
    let at = rest.find(marker).expect("marker not on page") + marker.len();
    digits(&rest[at..])
}

/// Number that follows the last `marker` before `anchor` in a page
fn id_before(page: &str, anchor: &str, marker: &str) -> i64 {
    let to = page.find(anchor).expect("anchor not on page");
    let at = page[..to].rfind(marker).expect("marker not on page") + marker.len();
    digits(&page[at..])
}

fn digits(text: &str) -> i64 {
    text.chars()
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .expect("no id on page")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let response = Client::new()
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness_reaches_database() {
    let response = Client::new()
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore]
async fn test_wrong_password_is_refused() {
    let page = login(&client(), "admin", "definitely-wrong").await;
    assert!(page.contains("Invalid username or password."));
}

#[tokio::test]
#[ignore]
async fn test_direct_issue_and_return_cycle() {
    let tag = suffix();
    let isbn = format!("9{}", &tag[..tag.len().min(12)]);
    let title = format!("Desk Copy {}", tag);

    let student = client();
    let registration_no = register_student(&student, &tag).await;

    let admin = client();
    let page = login(&admin, "admin", "admin").await;
    assert!(page.contains("You are now logged in as admin."));

    let page = add_book(&admin, &title, &isbn, 1).await;
    assert!(page.contains(&format!("Book '{}' added successfully.", title)), "{}", page);

    let issue = [
        ("registration_no", registration_no.as_str()),
        ("book_isbn", isbn.as_str()),
        ("due_date", ""),
    ];
    let page = post_page(&admin, "/issue/", &issue).await;
    assert!(page.contains(&format!("Book '{}' issued to Test Student successfully", title)), "{}", page);

    // the only copy is out now
    let page = post_page(&admin, "/issue/", &issue).await;
    assert!(page.contains("already has"), "{}", page);

    let page = post_page(
        &admin,
        "/issue/",
        &[("registration_no", "NO-SUCH-STUDENT"), ("book_isbn", isbn.as_str()), ("due_date", "")],
    )
    .await;
    assert!(page.contains("Student with Reg. No. NO-SUCH-STUDENT not found."));

    let dashboard = get_page(&student, "/dashboard/").await;
    assert!(dashboard.contains(&title));

    let renew_page = get_page(&admin, "/renew/").await;
    let issue_id = id_before(&renew_page, &title, "value=\"").to_string();
    let page = post_page(&admin, "/renew/", &[("issue_id", issue_id.as_str()), ("renewal_days", "10")]).await;
    assert!(page.contains(&format!("Book '{}' successfully renewed for Test Student by 10 days.", title)), "{}", page);

    let page = post_page(&admin, "/return/", &[("issue_id", issue_id.as_str())]).await;
    assert!(page.contains(&format!("Book '{}' returned successfully by Test Student.", title)), "{}", page);

    let page = post_page(&admin, "/return/", &[("issue_id", issue_id.as_str())]).await;
    assert!(page.contains("This book has already been returned."), "{}", page);

    let books = get_page(&admin, "/books/").await;
    let book_id = id_after(&books, &title, "/book/edit/");
    let page = post_page(&admin, &format!("/book/delete/{}/", book_id), &[]).await;
    assert!(page.contains(&format!("Book '{}' and all its records have been successfully deleted.", title)));
}

#[tokio::test]
#[ignore]
async fn test_borrow_request_approve_and_reject() {
    let tag = suffix();
    let isbn = format!("8{}", &tag[..tag.len().min(12)]);
    let title = format!("Request Queue {}", tag);

    let admin = client();
    login(&admin, "admin", "admin").await;
    add_book(&admin, &title, &isbn, 1).await;
    let books = get_page(&admin, "/books/").await;
    let book_id = id_after(&books, &title, "/book/edit/");
    let borrow = format!("/borrow/{}/", book_id);

    let first = client();
    let first_reg = register_student(&first, &format!("{}a", tag)).await;
    let second = client();
    let second_reg = register_student(&second, &format!("{}b", tag)).await;

    let page = post_page(&first, &borrow, &[]).await;
    assert!(
        page.contains(&format!("Request for '{}' submitted successfully.", title)),
        "{}",
        page
    );
    let page = post_page(&first, &borrow, &[]).await;
    assert!(page.contains("You already have a pending or approved request for"), "{}", page);

    let page = post_page(&second, &borrow, &[]).await;
    assert!(page.contains("submitted successfully"), "{}", page);

    let requests = get_page(&admin, "/requests/").await;
    let first_request = id_after(&requests, &first_reg, "/requests/approve/");
    let second_request = id_after(&requests, &second_reg, "/requests/approve/");

    let page = post_page(&admin, &format!("/requests/approve/{}/", first_request), &[]).await;
    assert!(
        page.contains(&format!("Book '{}' issued and request approved for Test Student.", title)),
        "{}",
        page
    );

    // the only copy went to the first request
    let page = post_page(&admin, &format!("/requests/approve/{}/", second_request), &[]).await;
    assert!(page.contains(&format!("Cannot approve. Book '{}' is out of stock.", title)), "{}", page);

    let page = post_page(&admin, &format!("/requests/reject/{}/", second_request), &[]).await;
    assert!(page.contains("Only pending requests can be rejected."), "{}", page);

    // once the copy is back a new request can still be turned down
    let third = client();
    let third_reg = register_student(&third, &format!("{}c", tag)).await;
    let return_page = get_page(&admin, "/return/").await;
    let issue_id = id_before(&return_page, &title, "value=\"").to_string();
    post_page(&admin, "/return/", &[("issue_id", issue_id.as_str())]).await;

    let page = post_page(&third, &borrow, &[]).await;
    assert!(page.contains("submitted successfully"), "{}", page);
    let requests = get_page(&admin, "/requests/").await;
    let third_request = id_after(&requests, &third_reg, "/requests/reject/");
    let page = post_page(&admin, &format!("/requests/reject/{}/", third_request), &[]).await;
    assert!(
        page.contains(&format!("Borrow request for {} from Test Student rejected.", title)),
        "{}",
        page
    );
}
