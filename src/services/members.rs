//! Member directory service

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::Loan,
        member::{CreateMember, Member, UpdateMember},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct MembersService {
    repository: Repository,
}

impl MembersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Member>> {
        self.repository.members.list().await
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Member> {
        self.repository.members.get_by_id(id).await
    }

    pub async fn create(&self, member: CreateMember) -> AppResult<Member> {
        if self.repository.members.email_exists(&member.email, None).await? {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        self.repository.members.create(&member).await
    }

    pub async fn update(&self, id: Uuid, member: UpdateMember) -> AppResult<Member> {
        if let Some(ref email) = member.email {
            if self.repository.members.email_exists(email, Some(id)).await? {
                return Err(AppError::Conflict("Email already registered".to_string()));
            }
        }
        self.repository.members.update(id, &member).await
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repository.members.delete(id).await
    }

    /// Open loans for a member
    pub async fn get_loans(&self, id: Uuid) -> AppResult<Vec<Loan>> {
        self.repository.members.get_by_id(id).await?;
        self.repository.loans.get_member_loans(id).await
    }
}
