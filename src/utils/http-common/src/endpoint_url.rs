// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use internal_error::InternalError;
use url::Url;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Appends path segments to a base URL, percent-encoding each of them.
///
/// A trailing slash of the base is dropped, so `http://host/api/` and
/// `http://host/api` produce the same endpoint.
pub fn endpoint_url(base: &Url, segments: &[&str]) -> Result<Url, InternalError> {
    let mut url = base.clone();

    url.path_segments_mut()
        .map_err(|()| InternalError::new(format!("URL '{base}' cannot be a base")))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
