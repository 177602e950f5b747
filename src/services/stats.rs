//! Dashboard and report figures

use chrono::{Duration, NaiveDate};

use crate::{
    config::LibraryConfig,
    error::AppResult,
    models::{
        borrow_request::RequestStatus,
        issue::{IssueDetails, LoanPolicy},
        student::Student,
        user::{Role, UserClaims},
    },
    repository::Repository,
};

/// Librarian overview
#[derive(Debug, Clone, Default)]
pub struct AdminDashboard {
    /// Copies owned, summed over all titles
    pub total_books: i64,
    pub total_students: i64,
    pub issued_books: i64,
    pub pending_requests: i64,
    pub overdue_books: i64,
}

/// A student's own loans and requests
#[derive(Debug, Clone)]
pub struct StudentDashboard {
    pub student: Student,
    pub today: NaiveDate,
    pub issues: Vec<IssueDetails>,
    pub due_soon: usize,
    pub overdue: usize,
    pub pending_requests: i64,
    pub approved_requests: i64,
}

impl StudentDashboard {
    pub fn total_issued(&self) -> usize {
        self.issues.len()
    }
}

#[derive(Debug, Clone)]
pub enum Dashboard {
    Admin(AdminDashboard),
    Student(StudentDashboard),
    /// Signed in but neither librarian nor student
    Unassigned,
}

/// Circulation report for librarians
#[derive(Debug, Clone)]
pub struct LibraryReport {
    pub today: NaiveDate,
    pub current_issues: Vec<IssueDetails>,
    pub returned: Vec<IssueDetails>,
    pub overdue: Vec<IssueDetails>,
    pub total_potential_fine: i64,
}

/// Issues due between today and `days` from now, inclusive
pub fn count_due_soon(issues: &[IssueDetails], today: NaiveDate, days: i64) -> usize {
    let horizon = today + Duration::days(days);
    issues
        .iter()
        .filter(|d| !d.issue.is_returned && d.issue.due_date >= today && d.issue.due_date <= horizon)
        .count()
}

pub fn count_overdue(issues: &[IssueDetails], today: NaiveDate) -> usize {
    issues.iter().filter(|d| d.issue.is_overdue(today)).count()
}

/// Fines accrued so far over the given issues
pub fn total_fine(issues: &[IssueDetails], today: NaiveDate, fine_per_day: i64) -> i64 {
    issues.iter().map(|d| d.issue.fine(today, fine_per_day)).sum()
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
    library: LibraryConfig,
    policy: LoanPolicy,
}

impl StatsService {
    pub fn new(repository: Repository, library: LibraryConfig, policy: LoanPolicy) -> Self {
        Self {
            repository,
            library,
            policy,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.library.today()
    }

    /// Dashboard for whoever is signed in
    pub async fn dashboard(&self, claims: &UserClaims) -> AppResult<Dashboard> {
        match (claims.role, claims.student_id) {
            (Role::Admin, _) => Ok(Dashboard::Admin(self.admin_dashboard().await?)),
            (Role::Student, Some(student_id)) => Ok(Dashboard::Student(self.student_dashboard(student_id).await?)),
            _ => Ok(Dashboard::Unassigned),
        }
    }

    pub async fn admin_dashboard(&self) -> AppResult<AdminDashboard> {
        let today = self.today();

        Ok(AdminDashboard {
            total_books: self.repository.books.total_quantity().await?,
            total_students: self.repository.students.count().await?,
            issued_books: self.repository.issues.count_open().await?,
            pending_requests: self
                .repository
                .borrow_requests
                .count_by_status(RequestStatus::Pending)
                .await?,
            overdue_books: self.repository.issues.count_overdue(today).await?,
        })
    }

    pub async fn student_dashboard(&self, student_id: i64) -> AppResult<StudentDashboard> {
        let today = self.today();
        let student = self.repository.students.get_by_id(student_id).await?;
        let issues = self.repository.issues.list_open_for_student(student_id).await?;

        let requests = &self.repository.borrow_requests;
        let pending_requests = requests.count_for_student(student_id, RequestStatus::Pending).await?;
        let approved_requests = requests.count_for_student(student_id, RequestStatus::Approved).await?;

        Ok(StudentDashboard {
            due_soon: count_due_soon(&issues, today, self.library.due_soon_days),
            overdue: count_overdue(&issues, today),
            student,
            today,
            issues,
            pending_requests,
            approved_requests,
        })
    }

    pub async fn report(&self) -> AppResult<LibraryReport> {
        let today = self.today();
        let current_issues = self.repository.issues.list_open_by_due_date().await?;
        let returned = self.repository.issues.list_returned().await?;

        let overdue: Vec<IssueDetails> = current_issues
            .iter()
            .filter(|d| d.issue.is_overdue(today))
            .cloned()
            .collect();
        let total_potential_fine = total_fine(&overdue, today, self.policy.fine_per_day);

        Ok(LibraryReport {
            today,
            current_issues,
            returned,
            overdue,
            total_potential_fine,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::issue::Issue;

    fn details(id: i64, due_date: NaiveDate, returned_on: Option<NaiveDate>) -> IssueDetails {
        IssueDetails {
            issue: Issue {
                id,
                book_id: id,
                student_id: 1,
                borrow_request_id: None,
                issue_date: due_date - Duration::days(7),
                due_date,
                is_returned: returned_on.is_some(),
                return_date: returned_on,
            },
            book_title: format!("Book {}", id),
            book_isbn: format!("{:013}", id),
            student_name: "Karim".to_string(),
            registration_no: "2020-EEE-014".to_string(),
        }
    }

    #[test]
    fn due_soon_window_is_inclusive_and_skips_overdue() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let issues = vec![
            details(1, today, None),
            details(2, today + Duration::days(3), None),
            details(3, today + Duration::days(4), None),
            details(4, today - Duration::days(1), None),
        ];
        assert_eq!(count_due_soon(&issues, today, 3), 2);
        assert_eq!(count_overdue(&issues, today), 1);
    }

    #[test]
    fn potential_fine_sums_overdue_days() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let issues = vec![
            details(1, today - Duration::days(2), None),
            details(2, today - Duration::days(5), None),
            details(3, today + Duration::days(5), None),
        ];
        assert_eq!(total_fine(&issues, today, 10), 70);
    }
}
