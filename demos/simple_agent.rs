//! Simple SNMP Agent Example
//!
//! A minimal agent serving the system group plus one settable counter.
//!
//! Run with: cargo run --example simple_agent
//!
//! Test with:
//!   snmpget -v2c -c public localhost:11161 sysDescr.0
//!   snmpwalk -v2c -c public localhost:11161 system
//!   snmpset -v2c -c public localhost:11161 1.3.6.1.4.1.99999.1.0 i 5

#![allow(clippy::result_large_err)]

use microsnmp::{Agent, MibObject, MibRegistry, Value, oid};
use std::time::Instant;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("microsnmp=debug".parse()?),
        )
        .init();

    let started = Instant::now();

    let mut mib = MibRegistry::new();
    mib.register(MibObject::scalar(
        oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), // sysDescr.0
        Value::from("microsnmp Example Agent v0.1"),
    ));
    mib.register(
        // sysUpTime.0, computed on every read
        MibObject::scalar(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0), Value::TimeTicks(0)).with_get(
            Box::new(move |_| {
                Some(Value::TimeTicks((started.elapsed().as_millis() / 10) as u32))
            }),
        ),
    );
    mib.register(MibObject::scalar(
        oid!(1, 3, 6, 1, 2, 1, 1, 4, 0), // sysContact.0
        Value::from("admin@example.com"),
    ));
    mib.register(MibObject::scalar(
        oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), // sysName.0
        Value::from("example-host"),
    ));
    mib.register(MibObject::scalar(
        oid!(1, 3, 6, 1, 2, 1, 1, 7, 0), // sysServices.0
        Value::Integer(72),
    ));
    mib.register(
        // A settable counter for demonstration
        MibObject::scalar(oid!(1, 3, 6, 1, 4, 1, 99999, 1, 0), Value::Integer(0)),
    );

    let agent = Agent::builder()
        .bind("0.0.0.0:11161")
        .community(b"public")
        .build()
        .await?;

    println!("Agent listening on {}", agent.local_addr());
    agent.run(&mut mib).await?;
    Ok(())
}
