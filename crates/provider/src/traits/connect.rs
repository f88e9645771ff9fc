// This file is part of Setcode.
//
// Setcode is free software: you can redistribute it and/or modify it under the
// terms of the GNU Lesser General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version.
//
// Setcode is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with Setcode.
// If not, see https://www.gnu.org/licenses/.

use super::EvmProvider;

/// Opens a provider for an RPC endpoint.
///
/// Sessions hold a connector so they can reconnect when the active chain changes.
pub trait Connect: Send + Sync {
    /// The provider produced by this connector
    type Provider: EvmProvider;

    /// Connect to the endpoint at `rpc_url`
    fn connect(&self, rpc_url: &str) -> anyhow::Result<Self::Provider>;
}
