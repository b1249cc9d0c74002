//! EC2 (VPC) implementation of `NetworkApi`

use crate::clients::AwsClients;
use crate::sdk::{convergence, lookup, mutation, required};
use async_trait::async_trait;
use aws_sdk_ec2::client::Waiters;
use aws_sdk_ec2::types as ec2;
use edgeflow_cloud::model::network::{
    AclAssociation, AclRule, Direction, Network, NetworkAcl, PeeringConnection, Route, RouteTable,
    RouteTarget, Subnet, SubnetRequest, Tag,
};
use edgeflow_cloud::{NetworkApi, Result};
use std::sync::Arc;
use std::time::Duration;

/// Upper bound for one VPC availability wait
pub const AVAILABLE_WAIT: Duration = Duration::from_secs(5 * 60);

pub struct Ec2Provider {
    clients: Arc<AwsClients>,
}

impl Ec2Provider {
    pub fn new(clients: Arc<AwsClients>) -> Self {
        Self { clients }
    }

    async fn client(&self) -> &aws_sdk_ec2::Client {
        self.clients.ec2().await
    }
}

fn filter(name: &str, value: &str) -> ec2::Filter {
    ec2::Filter::builder().name(name).values(value).build()
}

fn tags_from(tags: &[ec2::Tag]) -> Vec<Tag> {
    tags.iter()
        .filter_map(|t| Some(Tag::new(t.key()?, t.value().unwrap_or_default())))
        .collect()
}

fn id(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

#[async_trait]
impl NetworkApi for Ec2Provider {
    async fn describe_networks(&self, name: &str) -> Result<Vec<Network>> {
        let output = self
            .client()
            .await
            .describe_vpcs()
            .filters(filter("tag:Name", name))
            .send()
            .await
            .map_err(lookup("DescribeVpcs"))?;

        Ok(output
            .vpcs()
            .iter()
            .map(|v| Network {
                id: id(v.vpc_id()),
                cidr_block: id(v.cidr_block()),
                tags: tags_from(v.tags()),
            })
            .collect())
    }

    async fn create_network(&self, cidr_block: &str) -> Result<Network> {
        let output = self
            .client()
            .await
            .create_vpc()
            .cidr_block(cidr_block)
            .send()
            .await
            .map_err(mutation("CreateVpc"))?;

        let vpc = required(output.vpc(), "CreateVpc", "Vpc")?;
        let network = Network {
            id: required(vpc.vpc_id(), "CreateVpc", "VpcId")?.to_string(),
            cidr_block: cidr_block.to_string(),
            tags: tags_from(vpc.tags()),
        };
        tracing::info!("Created VPC {} ({})", network.id, cidr_block);
        Ok(network)
    }

    async fn wait_until_available(&self, network_id: &str) -> Result<()> {
        self.client()
            .await
            .wait_until_vpc_available()
            .vpc_ids(network_id)
            .wait(AVAILABLE_WAIT)
            .await
            .map_err(convergence(network_id))?;
        Ok(())
    }

    async fn create_tags(&self, resource_ids: &[String], tags: &[Tag]) -> Result<()> {
        let tags = tags
            .iter()
            .map(|t| ec2::Tag::builder().key(&t.key).value(&t.value).build())
            .collect();

        self.client()
            .await
            .create_tags()
            .set_resources(Some(resource_ids.to_vec()))
            .set_tags(Some(tags))
            .send()
            .await
            .map_err(mutation("CreateTags"))?;
        Ok(())
    }

    async fn create_acl(&self, network_id: &str) -> Result<String> {
        let output = self
            .client()
            .await
            .create_network_acl()
            .vpc_id(network_id)
            .send()
            .await
            .map_err(mutation("CreateNetworkAcl"))?;

        let acl = required(output.network_acl(), "CreateNetworkAcl", "NetworkAcl")?;
        Ok(required(acl.network_acl_id(), "CreateNetworkAcl", "NetworkAclId")?.to_string())
    }

    async fn create_acl_rule(&self, acl_id: &str, rule: &AclRule) -> Result<()> {
        let port_range = rule
            .port_range
            .as_ref()
            .map(|p| ec2::PortRange::builder().from(p.from).to(p.to).build());

        self.client()
            .await
            .create_network_acl_entry()
            .network_acl_id(acl_id)
            .rule_number(rule.rule_number)
            .protocol(rule.protocol.number())
            .rule_action(ec2::RuleAction::from(rule.action.as_str()))
            .egress(rule.direction == Direction::Egress)
            .cidr_block(&rule.cidr_block)
            .set_port_range(port_range)
            .send()
            .await
            .map_err(mutation("CreateNetworkAclEntry"))?;
        Ok(())
    }

    async fn describe_acls(&self, network_id: &str) -> Result<Vec<NetworkAcl>> {
        let output = self
            .client()
            .await
            .describe_network_acls()
            .filters(filter("vpc-id", network_id))
            .send()
            .await
            .map_err(lookup("DescribeNetworkAcls"))?;

        Ok(output
            .network_acls()
            .iter()
            .map(|acl| NetworkAcl {
                id: id(acl.network_acl_id()),
                network_id: id(acl.vpc_id()),
                is_default: acl.is_default().unwrap_or(false),
                associations: acl
                    .associations()
                    .iter()
                    .map(|a| AclAssociation {
                        association_id: id(a.network_acl_association_id()),
                        subnet_id: id(a.subnet_id()),
                    })
                    .collect(),
            })
            .collect())
    }

    async fn associate_acl(&self, association_id: &str, acl_id: &str) -> Result<String> {
        let output = self
            .client()
            .await
            .replace_network_acl_association()
            .association_id(association_id)
            .network_acl_id(acl_id)
            .send()
            .await
            .map_err(mutation("ReplaceNetworkAclAssociation"))?;
        Ok(id(output.new_association_id()))
    }

    async fn create_subnet(&self, request: &SubnetRequest) -> Result<String> {
        let output = self
            .client()
            .await
            .create_subnet()
            .vpc_id(&request.network_id)
            .cidr_block(&request.cidr_block)
            .availability_zone(&request.availability_zone)
            .send()
            .await
            .map_err(mutation("CreateSubnet"))?;

        let subnet = required(output.subnet(), "CreateSubnet", "Subnet")?;
        Ok(required(subnet.subnet_id(), "CreateSubnet", "SubnetId")?.to_string())
    }

    async fn describe_subnets(&self, network_id: &str) -> Result<Vec<Subnet>> {
        let output = self
            .client()
            .await
            .describe_subnets()
            .filters(filter("vpc-id", network_id))
            .send()
            .await
            .map_err(lookup("DescribeSubnets"))?;

        Ok(output
            .subnets()
            .iter()
            .map(|s| Subnet {
                id: id(s.subnet_id()),
                network_id: id(s.vpc_id()),
                cidr_block: id(s.cidr_block()),
                tags: tags_from(s.tags()),
            })
            .collect())
    }

    async fn modify_subnet_attribute(
        &self,
        subnet_id: &str,
        map_public_ip_on_launch: bool,
    ) -> Result<()> {
        self.client()
            .await
            .modify_subnet_attribute()
            .subnet_id(subnet_id)
            .map_public_ip_on_launch(
                ec2::AttributeBooleanValue::builder()
                    .value(map_public_ip_on_launch)
                    .build(),
            )
            .send()
            .await
            .map_err(mutation("ModifySubnetAttribute"))?;
        Ok(())
    }

    async fn create_gateway(&self) -> Result<String> {
        let output = self
            .client()
            .await
            .create_internet_gateway()
            .send()
            .await
            .map_err(mutation("CreateInternetGateway"))?;

        let gateway = required(
            output.internet_gateway(),
            "CreateInternetGateway",
            "InternetGateway",
        )?;
        Ok(required(
            gateway.internet_gateway_id(),
            "CreateInternetGateway",
            "InternetGatewayId",
        )?
        .to_string())
    }

    async fn attach_gateway(&self, gateway_id: &str, network_id: &str) -> Result<()> {
        self.client()
            .await
            .attach_internet_gateway()
            .internet_gateway_id(gateway_id)
            .vpc_id(network_id)
            .send()
            .await
            .map_err(mutation("AttachInternetGateway"))?;
        Ok(())
    }

    async fn create_route_table(&self, network_id: &str) -> Result<String> {
        let output = self
            .client()
            .await
            .create_route_table()
            .vpc_id(network_id)
            .send()
            .await
            .map_err(mutation("CreateRouteTable"))?;

        let table = required(output.route_table(), "CreateRouteTable", "RouteTable")?;
        Ok(required(table.route_table_id(), "CreateRouteTable", "RouteTableId")?.to_string())
    }

    async fn describe_route_tables(&self, network_id: &str) -> Result<Vec<RouteTable>> {
        let output = self
            .client()
            .await
            .describe_route_tables()
            .filters(filter("vpc-id", network_id))
            .send()
            .await
            .map_err(lookup("DescribeRouteTables"))?;

        Ok(output
            .route_tables()
            .iter()
            .map(|t| RouteTable {
                id: id(t.route_table_id()),
                network_id: id(t.vpc_id()),
                routes: t.routes().iter().map(route_from).collect(),
                tags: tags_from(t.tags()),
            })
            .collect())
    }

    async fn create_route(
        &self,
        route_table_id: &str,
        destination_cidr_block: &str,
        target: &RouteTarget,
    ) -> Result<()> {
        let request = self
            .client()
            .await
            .create_route()
            .route_table_id(route_table_id)
            .destination_cidr_block(destination_cidr_block);
        let request = match target {
            RouteTarget::Gateway(gateway_id) => request.gateway_id(gateway_id),
            RouteTarget::Peering(connection_id) => request.vpc_peering_connection_id(connection_id),
        };

        request
            .send()
            .await
            .map_err(mutation("CreateRoute"))?;
        Ok(())
    }

    async fn associate_route_table(&self, route_table_id: &str, subnet_id: &str) -> Result<String> {
        let output = self
            .client()
            .await
            .associate_route_table()
            .route_table_id(route_table_id)
            .subnet_id(subnet_id)
            .send()
            .await
            .map_err(mutation("AssociateRouteTable"))?;
        Ok(id(output.association_id()))
    }

    async fn describe_peering_connections(
        &self,
        connection_id: &str,
    ) -> Result<Vec<PeeringConnection>> {
        let output = self
            .client()
            .await
            .describe_vpc_peering_connections()
            .vpc_peering_connection_ids(connection_id)
            .send()
            .await
            .map_err(lookup("DescribeVpcPeeringConnections"))?;

        Ok(output
            .vpc_peering_connections()
            .iter()
            .map(|c| PeeringConnection {
                id: id(c.vpc_peering_connection_id()),
                status: c
                    .status()
                    .and_then(|s| s.code())
                    .map(|code| code.as_str().to_string())
                    .unwrap_or_default(),
            })
            .collect())
    }

    async fn accept_peering_connection(&self, connection_id: &str) -> Result<()> {
        self.client()
            .await
            .accept_vpc_peering_connection()
            .vpc_peering_connection_id(connection_id)
            .send()
            .await
            .map_err(mutation("AcceptVpcPeeringConnection"))?;
        tracing::info!("Accepted VPC peering connection {}", connection_id);
        Ok(())
    }
}

fn route_from(route: &ec2::Route) -> Route {
    let target = match (route.gateway_id(), route.vpc_peering_connection_id()) {
        (Some(gateway), _) => Some(RouteTarget::Gateway(gateway.to_string())),
        (None, Some(peering)) => Some(RouteTarget::Peering(peering.to_string())),
        (None, None) => None,
    };
    Route {
        destination_cidr_block: route.destination_cidr_block().map(str::to_string),
        target,
    }
}
