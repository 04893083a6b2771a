//! Member repository contracts and SQLite implementation.

use crate::model::audit::{now_epoch_ms, Address};
use crate::model::member::{Member, MemberId};
use crate::repo::error::RepoResult;
use crate::repo::{read_audit, AUDIT_COLUMNS};
use rusqlite::{params, Connection, Row};

/// Repository interface for member persistence.
pub trait MemberRepository {
    fn create_member(&self, member: &mut Member) -> RepoResult<MemberId>;
    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>>;
}

pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemberRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn create_member(&self, member: &mut Member) -> RepoResult<MemberId> {
        member.validate()?;
        member.audit.stamp_created(now_epoch_ms());

        self.conn.execute(
            &format!(
                "INSERT INTO members (name, city, street, zipcode, {AUDIT_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);"
            ),
            params![
                member.name.as_str(),
                member.address.city.as_deref(),
                member.address.street.as_deref(),
                member.address.zipcode.as_deref(),
                member.audit.created_by.as_deref(),
                member.audit.created_at,
                member.audit.last_modified_by.as_deref(),
                member.audit.last_modified_at,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        member.id = Some(id);
        Ok(id)
    }

    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT member_id, name, city, street, zipcode, {AUDIT_COLUMNS}
             FROM members
             WHERE member_id = ?1;"
        ))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_member_row(row)?));
        }
        Ok(None)
    }
}

fn parse_member_row(row: &Row<'_>) -> RepoResult<Member> {
    let member = Member {
        id: Some(row.get("member_id")?),
        name: row.get("name")?,
        address: Address {
            city: row.get("city")?,
            street: row.get("street")?,
            zipcode: row.get("zipcode")?,
        },
        audit: read_audit(row)?,
    };
    member.validate()?;
    Ok(member)
}
