use async_trait::async_trait;
use sqlx::{sqlite::SqliteConnection, Connection as _, QueryBuilder, Sqlite};
use tracing::{debug, info};

use club_data::{
    Delete, Error, Insert, Payment, PaymentFilter, PaymentUpdate, Query, Result, Retrieve, Update,
};

use crate::{
    results::{check_reference, Id},
    Connection,
};

/// Fetch payments matching the filter, newest first
pub(crate) async fn fetch(
    conn: &mut SqliteConnection,
    filter: &PaymentFilter,
) -> Result<Vec<Payment>> {
    let mut qry = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT
            id,
            member_id,
            amount,
            date,
            method,
            note
        FROM payments
        WHERE 1
        "#,
    );
    if let Some(id) = filter.id {
        qry.push(" AND id = ").push_bind(id);
    }
    if let Some(member_id) = filter.member_id {
        qry.push(" AND member_id = ").push_bind(member_id);
    }
    if let Some(date_before) = filter.date_before {
        qry.push(" AND date <= ").push_bind(date_before);
    }
    if let Some(date_after) = filter.date_after {
        qry.push(" AND date >= ").push_bind(date_after);
    }
    qry.push(" ORDER BY date DESC, id DESC");

    let payments: Vec<Payment> = qry.build_query_as().fetch_all(&mut *conn).await?;
    Ok(payments)
}

async fn fetch_one(conn: &mut SqliteConnection, id: u32) -> Result<Payment> {
    let filter = PaymentFilter {
        id: Some(id),
        ..Default::default()
    };
    fetch(conn, &filter)
        .await?
        .pop()
        .ok_or_else(|| Error::not_found("payment", id))
}

#[async_trait]
impl Query<Payment> for Connection {
    type Filter = PaymentFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Payment>> {
        let mut conn = self.lock().await;
        let payments = fetch(&mut conn, filter).await?;
        debug!(count = payments.len(), "queried payments");
        Ok(payments)
    }
}

#[async_trait]
impl Retrieve<Payment> for Connection {
    type Key = u32;

    async fn retrieve(&self, payment_id: Self::Key) -> Result<Payment> {
        let mut conn = self.lock().await;
        fetch_one(&mut conn, payment_id).await
    }
}

#[async_trait]
impl Insert<Payment> for Connection {
    async fn insert(&self, payment: Payment) -> Result<Payment> {
        payment.validate()?;

        let mut conn = self.lock().await;
        let mut tx = conn.begin().await?;
        check_reference(&mut tx, "members", payment.member_id, "payment", "member_id").await?;

        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"INSERT INTO payments (
                member_id,
                amount,
                date,
                method,
                note
            ) VALUES (
            "#,
        );
        qry.separated(", ")
            .push_bind(payment.member_id)
            .push_bind(payment.amount)
            .push_bind(payment.date)
            .push_bind(payment.method.clone())
            .push_bind(payment.note.clone());
        let insert: Id<u32> = qry
            .push(") RETURNING id ")
            .build_query_as()
            .fetch_one(&mut *tx)
            .await?;

        let payment = fetch_one(&mut tx, insert.id).await?;
        tx.commit().await?;

        info!(
            payment_id = payment.id,
            member_id = payment.member_id,
            amount = payment.amount,
            "payment recorded"
        );
        Ok(payment)
    }
}

#[async_trait]
impl Update<Payment> for Connection {
    type Key = u32;
    type Changes = PaymentUpdate;

    async fn update(&self, payment_id: Self::Key, changes: Self::Changes) -> Result<Payment> {
        let mut conn = self.lock().await;
        let mut tx = conn.begin().await?;

        let mut payment = fetch_one(&mut tx, payment_id).await?;
        changes.apply(&mut payment);
        payment.validate()?;

        QueryBuilder::<Sqlite>::new("UPDATE payments SET")
            .push(" amount = ")
            .push_bind(payment.amount)
            .push(", date = ")
            .push_bind(payment.date)
            .push(", method = ")
            .push_bind(payment.method.clone())
            .push(", note = ")
            .push_bind(payment.note.clone())
            .push(" WHERE id = ")
            .push_bind(payment_id)
            .build()
            .execute(&mut *tx)
            .await?;

        let payment = fetch_one(&mut tx, payment_id).await?;
        tx.commit().await?;

        info!(payment_id, "payment updated");
        Ok(payment)
    }
}

#[async_trait]
impl Delete<Payment> for Connection {
    type Key = u32;

    async fn delete(&self, payment_id: Self::Key) -> Result<Payment> {
        let mut conn = self.lock().await;
        let mut tx = conn.begin().await?;

        let payment = fetch_one(&mut tx, payment_id).await?;
        QueryBuilder::<Sqlite>::new("DELETE FROM payments WHERE id = ")
            .push_bind(payment_id)
            .build()
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(payment_id, "payment deleted");
        Ok(payment)
    }
}
