use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};

use club_data::{Delete, Insert, Payment, PaymentFilter, PaymentUpdate, Query, Retrieve, Update};

use super::Context;

#[derive(Subcommand, Debug)]
pub enum Payments {
    /// List payments. Members only see their own.
    #[clap(name = "list")]
    List(ListPayments),
    /// Record a payment
    #[clap(name = "add")]
    Add(AddPayment),
    /// Update a payment
    #[clap(name = "set")]
    Update(UpdatePayment),
    /// Delete a payment
    #[clap(name = "delete")]
    Delete(DeletePayment),
}

impl Payments {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Payments::List(cmd) => cmd.run(ctx).await,
            Payments::Add(cmd) => cmd.run(ctx).await,
            Payments::Update(cmd) => cmd.run(ctx).await,
            Payments::Delete(cmd) => cmd.run(ctx).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListPayments {
    #[clap(short, long)]
    pub member_id: Option<u32>,
    #[clap(short, long)]
    pub after_date: Option<NaiveDate>,
    #[clap(short, long)]
    pub before_date: Option<NaiveDate>,
}

impl ListPayments {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let filter = PaymentFilter {
            member_id: self.member_id,
            date_after: self.after_date,
            date_before: self.before_date,
            ..Default::default()
        };
        let payments: Vec<Payment> = ctx.guarded().query(&filter).await?;
        ctx.show(&payments)
    }
}

#[derive(Args, Debug)]
pub struct AddPayment {
    /// Defaults to the logged in member
    #[clap(short, long)]
    pub member_id: Option<u32>,
    #[clap(short, long)]
    pub amount: f64,
    /// Defaults to today
    #[clap(short, long)]
    pub date: Option<NaiveDate>,
    #[clap(short = 't', long, default_value = "Cash")]
    pub method: String,
    #[clap(short, long)]
    pub note: Option<String>,
}

impl AddPayment {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let member_id = ctx.member_or_self(self.member_id)?;
        let mut payment = Payment {
            method: Some(self.method),
            note: self.note,
            ..Payment::new(member_id, self.amount)
        };
        if let Some(date) = self.date {
            payment.date = date;
        }
        payment.validate()?;

        ctx.show(&payment)?;
        if !ctx.confirm("Add payment?")? {
            return Ok(());
        }

        let payment = ctx.guarded().insert(payment).await?;
        println!("Payment added with id {}.", payment.id);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct UpdatePayment {
    #[clap(short, long)]
    pub id: u32,
    #[clap(short, long)]
    pub amount: Option<f64>,
    #[clap(short, long)]
    pub date: Option<NaiveDate>,
    #[clap(short = 't', long)]
    pub method: Option<String>,
    #[clap(short, long)]
    pub note: Option<String>,
}

impl UpdatePayment {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let changes = PaymentUpdate {
            amount: self.amount,
            date: self.date,
            method: self.method,
            note: self.note,
        };
        let payment: Payment = ctx.guarded().update(self.id, changes).await?;
        ctx.show(&payment)
    }
}

#[derive(Args, Debug)]
pub struct DeletePayment {
    #[clap(short, long)]
    pub id: u32,
}

impl DeletePayment {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let db = ctx.guarded();
        let payment: Payment = db.retrieve(self.id).await?;
        ctx.show(&payment)?;
        if !ctx.confirm("Delete payment?")? {
            return Ok(());
        }
        let _: Payment = db.delete(payment.id).await?;
        println!("Payment {} deleted.", payment.id);
        Ok(())
    }
}
