use masterdesk::actions;
use masterdesk::db::Database;
use masterdesk::error::ActionError;
use masterdesk::models::*;
use masterdesk::validation::AMOUNT_TOO_LARGE;
use masterdesk::workload::CAPACITY_EXCEEDED;
use speculate2::speculate;
use uuid::Uuid;

fn master_form(name: &str, email: &str) -> MasterFormInput {
    MasterFormInput {
        name: Some(name.to_string()),
        email: Some(email.to_string()),
    }
}

fn application_form(
    master_id: Uuid,
    amount: &str,
    status: &str,
    complexity: i64,
) -> ApplicationFormInput {
    ApplicationFormInput {
        master_id: Some(master_id.to_string()),
        amount: Some(amount.to_string()),
        status: Some(status.to_string()),
        complexity: Some(complexity.to_string()),
    }
}

fn create_master(db: &Database) -> Master {
    actions::create_master(db, &master_form("Ada", "ada@example.com"))
        .expect("Failed to create master")
}

/// Seed pending work directly, bypassing the capacity check.
fn seed_pending(db: &Database, master_id: Uuid, complexity: i64) -> Application {
    let id = Uuid::new_v4();
    db.transaction(|conn| {
        conn.execute(
            "INSERT INTO invoices (id, customer_id, amount, status, complexity, date)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                master_id.to_string(),
                1_000_i64,
                "pending",
                complexity,
                "2024-01-01",
            ),
        )?;
        Ok(Ok::<_, ()>(()))
    })
    .expect("Failed to seed application")
    .expect("Seed rejected");

    db.get_application(id)
        .expect("Query failed")
        .expect("Seeded application missing")
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
    }

    describe "create_master" {
        it "stores the trimmed fields and assigns an avatar" {
            let master = actions::create_master(&db, &master_form("  Ada  ", " ada@example.com "))
                .expect("Create failed");

            assert_eq!(master.name, "Ada");
            assert_eq!(master.email, "ada@example.com");
            assert!(master.image_url.starts_with("/masters/"));
            assert_eq!(master.workload, 21);
        }

        it "rejects an invalid email without writing" {
            let err = actions::create_master(&db, &master_form("Ada", "not-an-email"))
                .expect_err("Should be rejected");

            assert!(err.field_errors().expect("Missing field errors").contains_key("email"));
            assert_eq!(err.to_string(), "Missing Fields. Failed to Create Master.");
            assert!(db.fetch_masters().expect("Query failed").is_empty());
        }
    }

    describe "update_master" {
        it "changes name and email" {
            let master = create_master(&db);

            let form = actions::update_master(&db, master.id, &master_form("Ada L.", "adal@example.com"))
                .expect("Update failed");

            assert_eq!(form.name, "Ada L.");
            let stored = db.get_master(master.id).expect("Query failed").expect("Master missing");
            assert_eq!(stored.email, "adal@example.com");
            assert_eq!(stored.image_url, master.image_url);
        }

        it "reports an unknown master" {
            let err = actions::update_master(&db, Uuid::new_v4(), &master_form("Ada", "ada@example.com"))
                .expect_err("Should fail");

            assert!(matches!(err, ActionError::NotFound(_)));
        }
    }

    describe "delete_master" {
        it "removes a master without applications" {
            let master = create_master(&db);

            let message = actions::delete_master(&db, master.id).expect("Delete failed");

            assert_eq!(message.message, "Deleted Master.");
            assert!(db.get_master(master.id).expect("Query failed").is_none());
        }

        it "refuses while applications are assigned" {
            let master = create_master(&db);
            seed_pending(&db, master.id, 3);

            let err = actions::delete_master(&db, master.id).expect_err("Should conflict");

            assert!(matches!(err, ActionError::Conflict(_)));
            assert!(db.get_master(master.id).expect("Query failed").is_some());
        }
    }

    describe "create_application" {
        it "stores the amount in cents dated today" {
            let master = create_master(&db);

            let app = actions::create_application(&db, &application_form(master.id, "12.34", "pending", 4))
                .expect("Create failed");

            assert_eq!(app.amount, 1_234);
            assert_eq!(app.status, ApplicationStatus::Pending);
            assert_eq!(app.complexity, 4);
            assert_eq!(app.date, chrono::Utc::now().date_naive());
        }

        it "accepts a pending application that keeps the workload below the threshold" {
            let master = create_master(&db);
            seed_pending(&db, master.id, 10);
            seed_pending(&db, master.id, 9);

            actions::create_application(&db, &application_form(master.id, "5", "pending", 1))
                .expect("Should be accepted at 20");

            assert_eq!(db.fetch_actual_workload(master.id).expect("Query failed"), 20);
        }

        it "rejects a pending application that reaches the threshold" {
            let master = create_master(&db);
            seed_pending(&db, master.id, 10);
            seed_pending(&db, master.id, 9);

            let err = actions::create_application(&db, &application_form(master.id, "5", "pending", 2))
                .expect_err("Should be rejected at 21");

            assert!(matches!(err, ActionError::Capacity(_)));
            assert_eq!(err.to_string(), CAPACITY_EXCEEDED);
            assert_eq!(db.fetch_actual_workload(master.id).expect("Query failed"), 19);
        }

        it "accepts paid work regardless of the current workload" {
            let master = create_master(&db);
            seed_pending(&db, master.id, 10);
            seed_pending(&db, master.id, 10);

            actions::create_application(&db, &application_form(master.id, "5", "paid", 10))
                .expect("Paid work is never rejected");

            assert_eq!(db.fetch_actual_workload(master.id).expect("Query failed"), 20);
        }

        it "rejects an amount beyond the storable range and keeps totals readable" {
            let master = create_master(&db);

            let err = actions::create_application(
                &db,
                &application_form(master.id, "1e300", "paid", 1),
            )
            .expect_err("Should be rejected");
            let errors = err.field_errors().expect("Missing field errors");
            assert_eq!(errors["amount"], vec![AMOUNT_TOO_LARGE]);

            actions::create_application(&db, &application_form(master.id, "21474836.47", "paid", 1))
                .expect("Largest storable amount should be accepted");
            actions::create_application(&db, &application_form(master.id, "21474836.47", "paid", 1))
                .expect("Largest storable amount should be accepted");
            actions::create_application(&db, &application_form(master.id, "5", "paid", 1))
                .expect("Create failed");

            let cards = db.fetch_card_data().expect("Card data should still load");
            assert_eq!(cards.number_of_applications, 3);
            assert_eq!(cards.total_paid_applications, "$42,949,677.94");
            let rows = db.fetch_filtered_masters("", 1).expect("Masters page should still load");
            assert_eq!(rows[0].total_applications, 3);
        }

        it "reports an unknown master as a field error" {
            let err = actions::create_application(&db, &application_form(Uuid::new_v4(), "5", "pending", 1))
                .expect_err("Should be rejected");

            let errors = err.field_errors().expect("Missing field errors");
            assert_eq!(errors["masterId"], vec!["Please select a master."]);
        }

        it "collects every invalid field" {
            let err = actions::create_application(&db, &ApplicationFormInput::default())
                .expect_err("Should be rejected");

            let errors = err.field_errors().expect("Missing field errors");
            assert!(errors.contains_key("masterId"));
            assert!(errors.contains_key("amount"));
            assert!(errors.contains_key("status"));
            assert!(errors.contains_key("complexity"));
            assert_eq!(err.to_string(), "Missing Fields. Failed to Create Application.");
        }
    }

    describe "update_application" {
        it "subtracts the prior complexity when master and status are unchanged" {
            let master = create_master(&db);
            let app = seed_pending(&db, master.id, 5);
            seed_pending(&db, master.id, 10);

            let updated = actions::update_application(&db, app.id, &application_form(master.id, "10", "pending", 10))
                .expect("15 - 5 + 10 = 20 should be accepted");

            assert_eq!(updated.complexity, 10);
            assert_eq!(db.fetch_actual_workload(master.id).expect("Query failed"), 20);
        }

        it "rejects a raise that reaches the threshold" {
            let master = create_master(&db);
            let app = seed_pending(&db, master.id, 5);
            seed_pending(&db, master.id, 10);
            seed_pending(&db, master.id, 4);

            let err = actions::update_application(&db, app.id, &application_form(master.id, "10", "pending", 7))
                .expect_err("19 - 5 + 7 = 21 should be rejected");

            assert!(matches!(err, ActionError::Capacity(_)));
            let stored = db.get_application(app.id).expect("Query failed").expect("Application missing");
            assert_eq!(stored.complexity, 5);
        }

        it "always allows marking pending work as paid" {
            let master = create_master(&db);
            let app = seed_pending(&db, master.id, 10);
            seed_pending(&db, master.id, 10);

            let updated = actions::update_application(&db, app.id, &application_form(master.id, "10", "paid", 10))
                .expect("Settling work is never rejected");

            assert_eq!(updated.status, ApplicationStatus::Paid);
            assert_eq!(db.fetch_actual_workload(master.id).expect("Query failed"), 10);
        }

        it "counts the full complexity when paid work returns to pending" {
            let master = create_master(&db);
            seed_pending(&db, master.id, 10);
            seed_pending(&db, master.id, 5);
            let paid = actions::create_application(&db, &application_form(master.id, "10", "paid", 6))
                .expect("Create failed");

            let err = actions::update_application(&db, paid.id, &application_form(master.id, "10", "pending", 6))
                .expect_err("15 + 6 = 21 should be rejected");

            assert!(matches!(err, ActionError::Capacity(_)));
        }

        it "checks the new master's workload on reassignment" {
            let busy = create_master(&db);
            let idle = actions::create_master(&db, &master_form("Bob", "bob@example.com"))
                .expect("Failed to create master");
            seed_pending(&db, busy.id, 10);
            seed_pending(&db, busy.id, 8);
            let app = seed_pending(&db, idle.id, 3);

            let err = actions::update_application(&db, app.id, &application_form(busy.id, "10", "pending", 3))
                .expect_err("18 + 3 = 21 should be rejected");
            assert!(matches!(err, ActionError::Capacity(_)));

            actions::update_application(&db, app.id, &application_form(busy.id, "10", "pending", 2))
                .expect("18 + 2 = 20 should be accepted");
            assert_eq!(db.fetch_actual_workload(busy.id).expect("Query failed"), 20);
            assert_eq!(db.fetch_actual_workload(idle.id).expect("Query failed"), 0);
        }

        it "reports an unknown application" {
            let master = create_master(&db);

            let err = actions::update_application(&db, Uuid::new_v4(), &application_form(master.id, "10", "paid", 1))
                .expect_err("Should fail");

            assert!(matches!(err, ActionError::NotFound(_)));
        }
    }

    describe "delete_application" {
        it "frees the deleted complexity" {
            let master = create_master(&db);
            let app = seed_pending(&db, master.id, 10);
            seed_pending(&db, master.id, 10);

            let message = actions::delete_application(&db, app.id).expect("Delete failed");
            assert_eq!(message.message, "Deleted Application.");
            assert_eq!(db.fetch_actual_workload(master.id).expect("Query failed"), 10);

            actions::create_application(&db, &application_form(master.id, "1", "pending", 10))
                .expect("Freed capacity should be usable");
        }

        it "reports an unknown application" {
            let err = actions::delete_application(&db, Uuid::new_v4()).expect_err("Should fail");
            assert!(matches!(err, ActionError::NotFound(_)));
        }
    }

    describe "master_workload" {
        it "reports current load and remaining room" {
            let master = create_master(&db);
            seed_pending(&db, master.id, 7);

            let snapshot = actions::master_workload(&db, master.id)
                .expect("Query failed")
                .expect("Master missing");

            assert_eq!(snapshot.workload, 7);
            assert_eq!(snapshot.threshold, 21);
            assert_eq!(snapshot.remaining, 13);
        }

        it "is None for an unknown master" {
            assert!(actions::master_workload(&db, Uuid::new_v4()).expect("Query failed").is_none());
        }
    }
}
