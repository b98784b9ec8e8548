use std::{
	collections::{
		HashMap,
		HashSet,
	},
	time::Instant,
};

use pfs_primitives::types::{
	Address,
	ChannelIdentifier,
	FeeAmount,
	TokenAddress,
	TokenAmount,
};

use crate::{
	constants::MAX_PATHS_PER_QUERY,
	errors::RoutingError,
	fees::{
		compute_fee,
		fee_to_weight,
	},
	token_network::TokenNetwork,
	types::{
		ChannelStatus,
		Path,
	},
};

/// Secondary ranking key preferring routes with fewer mobile mediators.
const SORT_DEMAND_AVOID_MOBILE: &str = "avoid_mobile";

/// A feasible route discovered by the search, pending ranking.
struct Candidate {
	/// Full route, source first.
	route: Vec<Address>,
	/// Total fee the sender must cover.
	fee: FeeAmount,
	/// Sum of the projected edge weights.
	weight: u64,
	/// Number of mobile intermediate hops.
	mobile_hops: usize,
}

impl TokenNetwork {
	/// Searches ranked routes from `source` to `target` able to carry
	/// `amount` of `token` within `max_hops` channel hops.
	///
	/// Routes are ranked by total weight, then hop count, then discovery
	/// order. A non-empty `sort_demand` selects a recognized secondary key;
	/// unknown values have no effect. When a `deadline` is given and
	/// expires mid-search, the routes ranked so far are returned inside
	/// the error.
	pub fn get_paths(
		&self,
		source: Address,
		target: Address,
		token: TokenAddress,
		amount: TokenAmount,
		max_hops: usize,
		sort_demand: &str,
		charge_source_fee: bool,
		deadline: Option<Instant>,
	) -> Result<Vec<Path>, RoutingError> {
		if amount.is_zero() {
			return Err(RoutingError::InvalidArgument("amount must be positive"))
		}
		if max_hops == 0 {
			return Err(RoutingError::InvalidArgument("max_hops must be positive"))
		}
		if source == target {
			return Err(RoutingError::InvalidArgument("source and target must differ"))
		}

		let decimals = *self.decimals.get(&token).ok_or(RoutingError::UnknownToken)?;
		if !self.token_to_token_network.contains_key(&token) {
			return Err(RoutingError::UnknownToken)
		}

		if !self.participant_status.contains_key(&source) ||
			!self.participant_status.contains_key(&target)
		{
			return Err(RoutingError::NoPath)
		}

		let mut search = PathSearch::new(
			self,
			source,
			target,
			token,
			amount,
			max_hops,
			charge_source_fee,
			decimals,
			deadline,
		);
		search.run();

		let paths = rank(search.candidates, sort_demand);
		if search.deadline_hit {
			return Err(RoutingError::DeadlineExceeded(paths))
		}
		if paths.is_empty() {
			return Err(RoutingError::NoPath)
		}
		Ok(paths)
	}
}

/// Ranks candidates by weight, then hop count; discovery order breaks the
/// remaining ties through the stable sort.
fn rank(mut candidates: Vec<Candidate>, sort_demand: &str) -> Vec<Path> {
	if sort_demand == SORT_DEMAND_AVOID_MOBILE {
		candidates.sort_by_key(|candidate| {
			(candidate.weight, candidate.route.len(), candidate.mobile_hops)
		});
	} else {
		candidates.sort_by_key(|candidate| (candidate.weight, candidate.route.len()));
	}

	candidates
		.into_iter()
		.map(|candidate| Path {
			path_hop: candidate.route.len() - 2,
			result: candidate.route[1..].to_vec(),
			fee: candidate.fee,
		})
		.collect()
}

/// Depth-first enumeration of all simple routes of bounded length.
///
/// The walk runs backward from the target so the amount a node must forward
/// is known when its channel is checked: the last hop carries exactly the
/// requested amount, every predecessor additionally carries the downstream
/// mediation fees.
struct PathSearch<'a> {
	graph: &'a TokenNetwork,
	/// Incoming edges per node, in channel view order.
	adjacency: HashMap<Address, Vec<(Address, ChannelIdentifier)>>,
	source: Address,
	max_hops: usize,
	charge_source_fee: bool,
	decimals: u32,
	deadline: Option<Instant>,
	/// Current partial route, target first.
	route: Vec<Address>,
	on_route: HashSet<Address>,
	candidates: Vec<Candidate>,
	deadline_hit: bool,
	target: Address,
	amount: TokenAmount,
}

impl<'a> PathSearch<'a> {
	#[allow(clippy::too_many_arguments)]
	fn new(
		graph: &'a TokenNetwork,
		source: Address,
		target: Address,
		token: TokenAddress,
		amount: TokenAmount,
		max_hops: usize,
		charge_source_fee: bool,
		decimals: u32,
		deadline: Option<Instant>,
	) -> Self {
		let mut adjacency: HashMap<Address, Vec<(Address, ChannelIdentifier)>> = HashMap::new();
		if let Some(view) = graph.channel_views.get(&token) {
			for identifier in view {
				if let Some(channel) = graph.channels.get(identifier) {
					let participant1 = channel.participant1.address;
					let participant2 = channel.participant2.address;
					adjacency.entry(participant2).or_default().push((participant1, *identifier));
					adjacency.entry(participant1).or_default().push((participant2, *identifier));
				}
			}
		}

		Self {
			graph,
			adjacency,
			source,
			max_hops,
			charge_source_fee,
			decimals,
			deadline,
			route: vec![],
			on_route: HashSet::new(),
			candidates: vec![],
			deadline_hit: false,
			target,
			amount,
		}
	}

	fn run(&mut self) {
		let target = self.target;
		let amount = self.amount;
		self.route.push(target);
		self.on_route.insert(target);
		self.visit(target, amount, FeeAmount::zero(), 0);
	}

	/// Extends the partial route backward from `node`, which must receive
	/// `required` tokens. `fees` and `weight` accumulate over the edges
	/// already on the route.
	fn visit(&mut self, node: Address, required: TokenAmount, fees: FeeAmount, weight: u64) {
		if self.deadline_hit || self.candidates.len() >= MAX_PATHS_PER_QUERY {
			return
		}
		if let Some(deadline) = self.deadline {
			if Instant::now() >= deadline {
				self.deadline_hit = true;
				return
			}
		}
		// Edges used so far; stop once no hop budget remains.
		if self.route.len() - 1 >= self.max_hops {
			return
		}

		let edge_count = match self.adjacency.get(&node) {
			Some(edges) => edges.len(),
			None => return,
		};

		for index in 0..edge_count {
			let (peer, channel_identifier) = self.adjacency[&node][index];
			if self.on_route.contains(&peer) {
				continue
			}

			let channel = match self.graph.channels.get(&channel_identifier) {
				Some(channel) => channel,
				None => continue,
			};
			if channel.status != ChannelStatus::Open {
				continue
			}
			let end = match channel.end_for(peer) {
				Some(end) => end,
				None => continue,
			};
			if end.balance < required {
				continue
			}

			if peer == self.source {
				let (fee, weight) = if self.charge_source_fee {
					let source_fee = compute_fee(&end.fee, required);
					(
						fees.saturating_add(source_fee),
						weight.saturating_add(fee_to_weight(source_fee, self.decimals)),
					)
				} else {
					(fees, weight)
				};

				let mut route = vec![peer];
				route.extend(self.route.iter().rev());
				let mobile_hops = self.mobile_hops(&route);
				self.candidates.push(Candidate { route, fee, weight, mobile_hops });
				continue
			}

			let status = match self.graph.participant_status.get(&peer) {
				Some(status) => *status,
				None => continue,
			};
			if !status.is_online {
				continue
			}

			let mediation_fee = compute_fee(&end.fee, required);
			self.route.push(peer);
			self.on_route.insert(peer);
			self.visit(
				peer,
				required.saturating_add(mediation_fee),
				fees.saturating_add(mediation_fee),
				weight.saturating_add(fee_to_weight(mediation_fee, self.decimals)),
			);
			self.route.pop();
			self.on_route.remove(&peer);
		}
	}

	/// Counts mobile intermediate hops on a complete route.
	fn mobile_hops(&self, route: &[Address]) -> usize {
		route[1..route.len() - 1]
			.iter()
			.filter(|address| {
				self.graph
					.participant_status
					.get(address)
					.map(|status| status.is_mobile)
					.unwrap_or(false)
			})
			.count()
	}
}
