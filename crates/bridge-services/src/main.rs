use bridge_services::config::BridgeConfig;
use bridge_services::lifecycle::BridgeSystem;
use bridge_services::model::{Customer, CustomerUpdate};
use rpc_bridge::tracing::setup_tracing;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = BridgeConfig::load().map_err(|e| {
        error!(error = %e, "Refusing to start");
        e.to_string()
    })?;
    info!(nats_url = %config.nats_url, "Starting bridge");

    let system = BridgeSystem::in_memory(&config)
        .await
        .map_err(|e| e.to_string())?;

    let span = tracing::info_span!("identity_demo");
    async {
        let registered = system
            .auth_client
            .register("alice", "alice@example.com", "correct horse")
            .await
            .map_err(|e| e.to_string())?;
        info!(message = %registered.message, ok = registered.context, "Register");

        let login = system
            .auth_client
            .login("alice@example.com", "correct horse")
            .await
            .map_err(|e| e.to_string())?;
        info!(ok = login.context, token_len = login.message.len(), "Login");

        let rejected = system
            .auth_client
            .login("alice@example.com", "wrong")
            .await
            .map_err(|e| e.to_string())?;
        info!(message = %rejected.message, ok = rejected.context, "Login with wrong password");
        Ok::<_, String>(())
    }
    .instrument(span)
    .await?;

    let span = tracing::info_span!("customer_demo");
    async {
        let customers = &system.customer_client;
        let created = customers
            .create(
                &Customer::new("ALFKI")
                    .with_contact_name("Maria Anders")
                    .with_city("Berlin")
                    .with_country("Germany"),
            )
            .await
            .map_err(|e| e.to_string())?;
        info!(customer = ?created, "Created");

        let partial = CustomerUpdate {
            city: Some("Hamburg".to_string()),
            ..CustomerUpdate::default()
        };
        let updated = customers
            .update("ALFKI", partial)
            .await
            .map_err(|e| e.to_string())?;
        info!(customer = ?updated, "Updated");

        let stored = customers.get("ALFKI").await.map_err(|e| e.to_string())?;
        info!(customer = ?stored, "Fetched");

        customers.delete("ALFKI").await.map_err(|e| e.to_string())?;
        match customers.get("ALFKI").await {
            Ok(customer) => error!(customer = ?customer, "Still present after delete"),
            Err(e) => info!(error = ?e.remote_message(), "Gone after delete"),
        }
        Ok::<_, String>(())
    }
    .instrument(span)
    .await?;

    system.shutdown().await;
    info!("Application completed successfully");
    Ok(())
}
